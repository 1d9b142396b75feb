use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Error;

/// The keyed feature lookup built by one extraction run.
/// Keys are `"<category>/<file-stem>"`; values are the pooled model outputs.
pub type FeatureMap = BTreeMap<String, Vec<f32>>;

/// Write the accumulated feature vectors as a single JSON object at
/// `output_path`, creating parent directories as needed.
///
/// Each run fully overwrites the artifact; there is no merge with prior
/// contents and no partial persistence mid-run.
pub fn write_features(features: &FeatureMap, output_path: &Path) -> Result<(), Error>
{
    if let Some(parent) = output_path.parent()
    {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, features)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn empty_map_produces_empty_json_object()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_features.json");

        write_features(&FeatureMap::new(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn creates_missing_parent_directories()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset").join("image_features.json");

        let mut features = FeatureMap::new();
        features.insert("tops/abc".to_string(), vec![0.25, -1.0]);
        write_features(&features, &path).unwrap();

        let round_trip: FeatureMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(round_trip, features);
    }

    #[test]
    fn rerun_overwrites_previous_artifact()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_features.json");

        let mut first = FeatureMap::new();
        first.insert("tops/old".to_string(), vec![1.0]);
        write_features(&first, &path).unwrap();

        let mut second = FeatureMap::new();
        second.insert("shoes/new".to_string(), vec![2.0]);
        write_features(&second, &path).unwrap();

        let round_trip: FeatureMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(round_trip, second);
        assert!(!round_trip.contains_key("tops/old"));
    }
}
