#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Ort(#[from] ort::Error),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("The model returned a feature vector of length {actual}, expected {expected}.")]
    FeatureLength { expected: usize, actual: usize },
}
