use std::path::Path;

use env_logger::Env;
use log::info;

use fashion_features::dataset;
use fashion_features::mobilenet::Mobilenet;

fn main() -> anyhow::Result<()>
{
    // Progress is the whole user interface of this tool, so default to Info
    // rather than env_logger's usual Error.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Loading MobileNetV2 model...");
    let model = Mobilenet::new()?;
    info!("Model loaded successfully!");

    // No CLI surface: like the backend scripts this ships with, all paths are
    // derived from the crate's own location, next to the dataset directory.
    let base = Path::new(env!("CARGO_MANIFEST_DIR"));
    let dataset_root = base.join("..").join("dataset").join("dataset_clothing_images");
    let output_path = base.join("..").join("dataset").join("image_features.json");

    dataset::run(&dataset_root, &output_path, &model)?;

    Ok(())
}
