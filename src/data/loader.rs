use anyhow::Context;
use image::{open, GrayImage, Luma};
use ndarray::{Array2, ArrayView2};
use std::path::Path;

use crate::Image;

/// Loads any format the `image` crate decodes as grayscale intensities in
/// `[0, 1]`.
pub fn load_image<P: AsRef<Path>>(path: P) -> crate::Result<Image> {
    let path = path.as_ref();
    let img = open(path).with_context(|| format!("Failed to open image {:?}", path))?;
    let luma = img.to_luma32f();
    let (width, height) = luma.dimensions();
    let data = luma.into_raw().into_iter().map(f64::from).collect();
    Ok(Array2::from_shape_vec((height as usize, width as usize), data)?)
}

/// Converts intensities in `[0, 1]` to 8-bit, clamping values outside.
pub fn to_gray_image(image: &ArrayView2<f64>) -> GrayImage {
    let (rows, cols) = image.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = image[[y as usize, x as usize]];
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Luma([(v * 255.0).round() as u8])
    })
}

pub fn save_image<P: AsRef<Path>>(image: &ArrayView2<f64>, path: P) -> crate::Result<()> {
    let path = path.as_ref();
    to_gray_image(image)
        .save(path)
        .with_context(|| format!("Failed to save image {:?}", path))?;
    Ok(())
}

pub fn validate_image_size(image: &ArrayView2<f64>, min_size: u32, max_size: u32) -> crate::Result<()> {
    let (rows, cols) = image.dim();
    if rows < min_size as usize || cols < min_size as usize {
        return Err(anyhow::anyhow!(
            "Image too small: {}x{}, minimum: {}x{}",
            cols,
            rows,
            min_size,
            min_size
        ));
    }
    if rows > max_size as usize || cols > max_size as usize {
        return Err(anyhow::anyhow!(
            "Image too large: {}x{}, maximum: {}x{}",
            cols,
            rows,
            max_size,
            max_size
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_png() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ramp.png");
        let image = Array2::from_shape_fn((6, 9), |(r, c)| (r * 9 + c) as f64 / 53.0);

        save_image(&image.view(), &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.dim(), (6, 9));
        for (a, b) in loaded.iter().zip(image.iter()) {
            assert!((a - b).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let image = Array2::from_shape_vec((1, 3), vec![-0.2, 0.5, 1.7]).unwrap();
        let gray = to_gray_image(&image.view());
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 128);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_image("/nonexistent/image.png").is_err());
    }

    #[test]
    fn test_validate_image_size() {
        let image = Array2::<f64>::zeros((10, 20));
        assert!(validate_image_size(&image.view(), 8, 64).is_ok());
        assert!(validate_image_size(&image.view(), 16, 64).is_err());
        assert!(validate_image_size(&image.view(), 8, 12).is_err());
    }
}
