/// Preprocessing functions for input data for the MobileNetV2 model.
/// Do not use these functions for any other purpose (for example,
/// to load images for purposes other than feature extraction):
/// the normalization here is specific to how the network was trained.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array, Dim};

use crate::error::Error;

pub const IMAGE_INPUT_SIZE: usize = 224;
pub const FEATURE_VECTOR_LENGTH: usize = 1280;

/// Decode the image at `path` and convert it into the model input tensor.
pub fn load_image(path: &Path) -> Result<Array<f32, Dim<[usize; 4]>>, Error>
{
    let img = image::open(path)?;
    Ok(image_to_model_input(&img))
}

/// Convert a decoded image into the 4D array expected by the network:
/// shape (1, 3, IMAGE_INPUT_SIZE, IMAGE_INPUT_SIZE), NCHW, RGB channel order,
/// each channel scaled to [-1, 1] (MobileNetV2's `preprocess_input`).
///
/// The resize deliberately does not preserve aspect ratio; the network
/// expects a fixed 224x224 input and the dataset images are near-square
/// product photos.
pub fn image_to_model_input(img: &DynamicImage) -> Array<f32, Dim<[usize; 4]>>
{
    // Flatten RGBA/palette/grayscale images down to 3-channel RGB before
    // resampling.
    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(
        &rgb,
        IMAGE_INPUT_SIZE as u32,
        IMAGE_INPUT_SIZE as u32,
        FilterType::Lanczos3);

    let mut input = Array::zeros((1, 3, IMAGE_INPUT_SIZE, IMAGE_INPUT_SIZE));
    for (x, y, pixel) in resized.enumerate_pixels()
    {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        input[[0, 0, y, x]] = (r as f32) / 127.5 - 1.;
        input[[0, 1, y, x]] = (g as f32) / 127.5 - 1.;
        input[[0, 2, y, x]] = (b as f32) / 127.5 - 1.;
    }

    input
}

#[cfg(test)]
mod tests
{
    use approx::assert_abs_diff_eq;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use ndarray::Axis;

    use super::*;

    #[test]
    fn model_input_has_fixed_shape()
    {
        // Deliberately not 224x224 and not square.
        let img = DynamicImage::ImageRgb8(RgbImage::new(37, 111));
        let input = image_to_model_input(&img);
        assert_eq!(input.shape(), &[1, 3, IMAGE_INPUT_SIZE, IMAGE_INPUT_SIZE]);
    }

    #[test]
    fn normalization_scales_channels_to_unit_range()
    {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 255, 128])));
        let input = image_to_model_input(&img);

        // A solid-color image survives resampling unchanged, so every spatial
        // position carries the per-channel normalized value.
        assert_abs_diff_eq!(input[[0, 0, 100, 100]], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(input[[0, 1, 100, 100]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(input[[0, 2, 100, 100]], 128. / 127.5 - 1., epsilon = 1e-6);
    }

    #[test]
    fn alpha_channel_is_discarded()
    {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([200, 10, 30, 0])));
        let input = image_to_model_input(&img);

        // Only three channel planes, with the RGB values intact.
        assert_eq!(input.len_of(Axis(1)), 3);
        assert_abs_diff_eq!(input[[0, 0, 0, 0]], 200. / 127.5 - 1., epsilon = 1e-6);
    }

    #[test]
    fn grayscale_is_broadcast_to_three_channels()
    {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(64, 64, image::Luma([100])));
        let input = image_to_model_input(&img);

        let expected = 100. / 127.5 - 1.;
        for c in 0..3
        {
            assert_abs_diff_eq!(input[[0, c, 50, 50]], expected, epsilon = 1e-6);
        }
    }
}
