//! Normalizes receipt photos before they are stored.
//!
//! A photo is center-cropped to the aspect ratio of the target size, scaled to
//! exactly the target size and then compressed as a JPEG.

use image::{
    GenericImageView,
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
};

use crate::Error;

/// The size receipt photos are stored at.
pub const RECEIPT_PHOTO_SIZE: TargetSize = TargetSize {
    width: 500,
    height: 500,
};

/// JPEG quality on a scale of 1 to 100.
const JPEG_QUALITY: u8 = 50;

/// The width and height, in pixels, of a normalized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    /// The width in pixels.
    pub width: u32,
    /// The height in pixels.
    pub height: u32,
}

/// Scale, crop and compress the encoded image `raw` so that it is exactly `target` in size.
///
/// The same input always produces the same output.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EmptyImage] if the image or `target` has a zero width or height,
/// - [Error::InvalidImage] if `raw` is not a JPEG or PNG image,
/// - or [Error::ImageEncoding] if the JPEG could not be written.
pub fn normalize(raw: &[u8], target: TargetSize) -> Result<Vec<u8>, Error> {
    if target.width == 0 || target.height == 0 {
        return Err(Error::EmptyImage);
    }

    let source =
        image::load_from_memory(raw).map_err(|error| Error::InvalidImage(error.to_string()))?;
    let (source_width, source_height) = source.dimensions();

    if source_width == 0 || source_height == 0 {
        return Err(Error::EmptyImage);
    }

    // Crop first, only the region that survives is ever resized.
    let scale = f64::max(
        f64::from(target.height) / f64::from(source_height),
        f64::from(target.width) / f64::from(source_width),
    );
    let crop_width = unscale_dimension(target.width, scale).clamp(1, source_width);
    let crop_height = unscale_dimension(target.height, scale).clamp(1, source_height);
    let x = (source_width - crop_width) / 2;
    let y = (source_height - crop_height) / 2;

    let region = source.crop_imm(x, y, crop_width, crop_height).to_rgb8();
    let cropped = imageops::resize(&region, target.width, target.height, FilterType::Triangle);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&cropped)
        .map_err(|error| Error::ImageEncoding(error.to_string()))?;

    tracing::debug!(
        "Normalized {source_width}x{source_height} image ({} bytes) to {}x{} JPEG ({} bytes)",
        raw.len(),
        target.width,
        target.height,
        jpeg.len()
    );

    Ok(jpeg)
}

/// The number of source pixels that cover `dimension` target pixels.
fn unscale_dimension(dimension: u32, scale: f64) -> u32 {
    (f64::from(dimension) / scale).round() as u32
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

    use crate::Error;

    use super::{RECEIPT_PHOTO_SIZE, TargetSize, normalize};

    fn encode_png(image: RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("Could not encode test PNG");
        bytes.into_inner()
    }

    /// A wide image with a green square in the middle and red bars either side.
    fn wide_image_with_green_center() -> Vec<u8> {
        let image = RgbImage::from_fn(1000, 500, |x, _| {
            if (250..750).contains(&x) {
                Rgb([0, 255, 0])
            } else {
                Rgb([255, 0, 0])
            }
        });

        encode_png(image)
    }

    #[test]
    fn output_is_exactly_the_target_size() {
        let cases = [(1000, 600), (200, 400), (500, 500), (3, 7), (1234, 567)];

        for (width, height) in cases {
            let raw = encode_png(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));

            let normalized = normalize(&raw, RECEIPT_PHOTO_SIZE)
                .unwrap_or_else(|error| panic!("Could not normalize {width}x{height}: {error}"));

            let decoded = image::load_from_memory(&normalized).expect("Output is not an image");
            assert_eq!(
                decoded.dimensions(),
                (500, 500),
                "wrong size for {width}x{height} input"
            );
        }
    }

    #[test]
    fn extreme_aspect_ratios_are_cropped_before_scaling() {
        for (width, height) in [(1, 20_000), (20_000, 1)] {
            let raw = encode_png(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])));

            let normalized = normalize(&raw, RECEIPT_PHOTO_SIZE)
                .unwrap_or_else(|error| panic!("Could not normalize {width}x{height}: {error}"));

            let decoded = image::load_from_memory(&normalized).unwrap();
            assert_eq!(decoded.dimensions(), (500, 500));
        }
    }

    #[test]
    fn output_is_jpeg() {
        let raw = encode_png(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])));

        let normalized = normalize(&raw, RECEIPT_PHOTO_SIZE).unwrap();

        assert_eq!(
            image::guess_format(&normalized).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn crops_from_the_center() {
        let raw = wide_image_with_green_center();

        let normalized = normalize(&raw, RECEIPT_PHOTO_SIZE).unwrap();

        let decoded = image::load_from_memory(&normalized).unwrap().to_rgb8();
        for (x, y) in [(5, 5), (250, 250), (494, 494), (5, 494), (494, 5)] {
            let Rgb([red, green, _]) = *decoded.get_pixel(x, y);
            assert!(
                green > 200 && red < 60,
                "want green at ({x}, {y}), got red={red} green={green}"
            );
        }
    }

    #[test]
    fn non_square_target() {
        let raw = encode_png(RgbImage::from_pixel(300, 300, Rgb([200, 200, 200])));
        let target = TargetSize {
            width: 120,
            height: 80,
        };

        let normalized = normalize(&raw, target).unwrap();

        let decoded = image::load_from_memory(&normalized).unwrap();
        assert_eq!(decoded.dimensions(), (120, 80));
    }

    #[test]
    fn is_deterministic() {
        let raw = wide_image_with_green_center();

        let first = normalize(&raw, RECEIPT_PHOTO_SIZE).unwrap();
        let second = normalize(&raw, RECEIPT_PHOTO_SIZE).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn fails_on_zero_target() {
        let raw = encode_png(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));

        for target in [
            TargetSize {
                width: 0,
                height: 10,
            },
            TargetSize {
                width: 10,
                height: 0,
            },
        ] {
            assert_eq!(normalize(&raw, target), Err(Error::EmptyImage));
        }
    }

    #[test]
    fn fails_on_bytes_that_are_not_an_image() {
        let result = normalize(b"definitely not a photo", RECEIPT_PHOTO_SIZE);

        assert!(
            matches!(result, Err(Error::InvalidImage(_))),
            "want invalid image error, got {result:?}"
        );
    }

    #[test]
    fn fails_on_empty_input() {
        let result = normalize(&[], RECEIPT_PHOTO_SIZE);

        assert!(
            matches!(result, Err(Error::InvalidImage(_))),
            "want invalid image error, got {result:?}"
        );
    }
}
