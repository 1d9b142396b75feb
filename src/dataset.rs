use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::Error;
use crate::features::{self, FeatureMap};
use crate::mobilenet::FeatureExtractor;

/// Extensions recognized as dataset images, matched ASCII case-insensitively.
/// The clothing dataset ships as jpg-only; anything else in a category
/// directory is skipped (and debug-logged) rather than decoded.
const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// The accumulated output of one extraction run.
pub struct ExtractionRun
{
    pub features: FeatureMap,
    /// Candidate image files found across all categories.
    pub total_images: usize,
    /// Images that made it through decode + inference.
    pub processed: usize,
}

/// Top-level pipeline: walk the dataset, extract a feature vector per image,
/// and write the JSON artifact to `output_path`.
///
/// Returns `Ok(None)` when the dataset root is missing; nothing is written in
/// that case and the process still exits cleanly.
pub fn run(
    dataset_root: &Path,
    output_path: &Path,
    extractor: &impl FeatureExtractor,
) -> Result<Option<ExtractionRun>, Error>
{
    if !dataset_root.is_dir()
    {
        warn!("Dataset path not found: {}", dataset_root.display());
        return Ok(None);
    }

    let run = process_dataset(dataset_root, extractor)?;
    features::write_features(&run.features, output_path)?;

    info!("Processing complete!");
    info!("Total images: {}", run.total_images);
    info!("Successfully processed: {}", run.processed);
    info!("Features saved to: {}", output_path.display());

    Ok(Some(run))
}

/// Walk every category directory under `dataset_root` and extract features
/// for each image file, accumulating successes into the feature map.
///
/// Only the immediate children of the root are treated as categories;
/// stray files at the top level are ignored. A failed extraction is logged
/// and the image omitted, never fatal to the run.
pub fn process_dataset(
    dataset_root: &Path,
    extractor: &impl FeatureExtractor,
) -> Result<ExtractionRun, Error>
{
    let mut features = FeatureMap::new();
    let mut total_images = 0;
    let mut processed = 0;

    // Sorted so progress output and failure logs are reproducible run-to-run.
    let mut categories: Vec<PathBuf> = fs::read_dir(dataset_root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    categories.sort();

    for category_dir in &categories
    {
        let category = dir_name(category_dir);
        info!("Processing category: {}", category);

        let mut image_files = Vec::new();
        for entry in fs::read_dir(category_dir)?
        {
            let path = entry?.path();
            if !path.is_file()
            {
                continue;
            }
            if is_image_file(&path)
            {
                image_files.push(path);
            }
            else
            {
                debug!("Skipping non-image file: {}", path.display());
            }
        }
        image_files.sort();
        total_images += image_files.len();

        for img_file in &image_files
        {
            let image_id = format!("{}/{}", category, file_stem(img_file));

            match extractor.extract(img_file)
            {
                Ok(vector) =>
                {
                    debug!("Processed {}", image_id);
                    features.insert(image_id, vector);
                    processed += 1;
                }
                Err(e) => warn!("Error processing {}: {}", img_file.display(), e),
            }
        }
    }

    Ok(ExtractionRun { features, total_images, processed })
}

fn is_image_file(path: &Path) -> bool
{
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        == Some(true)
}

fn dir_name(path: &Path) -> String
{
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn file_stem(path: &Path) -> String
{
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}
