use std::path::Path;

use ndarray::{Array, Array2, Axis, Dim};
use ort::{self, inputs, CPUExecutionProvider, GraphOptimizationLevel};

use crate::error::Error;
use crate::preprocessing::{self, FEATURE_VECTOR_LENGTH};

/// Anything that can turn an image file into a fixed-length feature vector.
///
/// The dataset walker only depends on this trait, so it can be exercised
/// without ONNX weights on disk.
pub trait FeatureExtractor
{
    /// Produce the pooled feature vector for the image at `path`,
    /// or an error if the file cannot be decoded or encoded.
    fn extract(&self, path: &Path) -> Result<Vec<f32>, Error>;
}

/// The MobileNetV2 feature extraction model.
///
/// This is an ImageNet-pretrained MobileNetV2 with the classification head
/// removed and global average pooling applied to the final feature map, so a
/// forward pass yields a single 1280-float embedding per image rather than
/// class logits. The embeddings are used downstream as a visual similarity
/// proxy for clothing recommendations.
///
/// Uses an ONNX representation of the model so that it can be used in Rust,
/// and to execute the model on a wide variety of hardware using the ONNX
/// runtime. The session is created once at startup and reused for every
/// inference call.
pub struct Mobilenet
{
    session: ort::Session,
}

impl Mobilenet
{
    pub fn new() -> Result<Self, ort::Error>
    {
        let session = ort::Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .commit_from_file(Path::new(env!("CARGO_MANIFEST_DIR")).join("models").join("mobilenetv2.onnx"))?;

        Ok(Mobilenet { session })
    }

    /// Given a batch of preprocessed images, returns the pooled feature
    /// vectors from the network. Use `preprocessing::load_image()` to build
    /// the input array.
    ///
    /// Returns a 2D array of shape (batch_size, FEATURE_VECTOR_LENGTH).
    pub fn encode_image(&self, images: Array<f32, Dim<[usize; 4]>>) -> Result<Array2<f32>, Error>
    {
        let images_len = images.len_of(Axis(0));
        let outputs = self.session.run(inputs![images]?)?;

        let output = &outputs["features"];

        // First dimension is for each image in the batch; the second is the
        // feature vector per image.
        let output = output.try_extract_tensor::<f32>()?;

        if output.len() != images_len * FEATURE_VECTOR_LENGTH
        {
            return Err(Error::FeatureLength {
                expected: FEATURE_VECTOR_LENGTH,
                actual: output.len() / images_len.max(1),
            });
        }

        let output = output.into_shape((images_len, FEATURE_VECTOR_LENGTH))?.to_owned();

        Ok(output)
    }
}

impl FeatureExtractor for Mobilenet
{
    fn extract(&self, path: &Path) -> Result<Vec<f32>, Error>
    {
        let input = preprocessing::load_image(path)?;
        let features = self.encode_image(input)?;

        Ok(features.index_axis(Axis(0), 0).to_vec())
    }
}
