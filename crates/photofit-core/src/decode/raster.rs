//! Source decoding: bytes in any accepted format to an upright RGB raster.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};

use super::{DecodeError, Orientation, RasterImage};

/// Decode an uploaded image into an upright RGB raster.
///
/// The format is sniffed from the bytes, not taken from the declared MIME
/// type. EXIF orientation is applied so that the returned dimensions are the
/// ones the user sees, and any alpha channel is composited onto white.
///
/// # Errors
///
/// Returns `DecodeError::UnrecognizedFormat` if the format cannot be detected,
/// `DecodeError::CorruptedFile` if the codec fails part-way, and
/// `DecodeError::InvalidDimensions` if the decoded image is empty.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::UnrecognizedFormat(
            "no known image signature".to_string(),
        ));
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    RasterImage::from_rgb_image(flatten_onto_white(oriented))
}

/// Read the EXIF orientation tag, defaulting to `Normal` when absent.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Drop the alpha channel by compositing over an opaque white background.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(r), blend(g), blend(b)]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        buffer.into_inner()
    }

    /// Insert an APP1 Exif segment carrying only an orientation tag.
    fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = b"MM\0\x2A\0\0\0\x08".to_vec();
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    fn quad() -> DynamicImage {
        let pixels = vec![
            255, 0, 0, 0, 255, 0, // A B
            0, 0, 255, 255, 255, 0, // C D
        ];
        DynamicImage::ImageRgb8(RgbImage::from_raw(2, 2, pixels).unwrap())
    }

    #[test]
    fn test_decode_png() {
        let img = RgbImage::from_pixel(40, 30, Rgb([10, 20, 30]));
        let bytes = encode_png(DynamicImage::ImageRgb8(img));

        let raster = decode_image(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (40, 30));
        assert_eq!(&raster.pixels()[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode_test_jpeg(64, 48);
        let raster = decode_image(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (64, 48));
    }

    #[test]
    fn test_decode_garbage_is_unrecognized() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let img = RgbImage::from_pixel(40, 30, Rgb([10, 20, 30]));
        let bytes = encode_png(DynamicImage::ImageRgb8(img));

        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        let bytes = encode_png(DynamicImage::ImageRgba8(img));

        let raster = decode_image(&bytes).unwrap();
        assert_eq!(raster.pixels(), &[255, 255, 255, 200, 100, 50]);
    }

    #[test]
    fn test_half_transparent_pixel_blends() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(DynamicImage::ImageRgba8(img));
        // 255 * 127 / 255 rounded
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(extract_orientation(&encode_test_jpeg(8, 8)), Orientation::Normal);
        assert_eq!(extract_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_extract_orientation_from_exif() {
        let bytes = with_exif_orientation(&encode_test_jpeg(40, 20), 6);
        assert_eq!(extract_orientation(&bytes), Orientation::Rotate90CW);
    }

    #[test]
    fn test_decode_applies_exif_rotation() {
        let bytes = with_exif_orientation(&encode_test_jpeg(40, 20), 6);

        let raster = decode_image(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (20, 40));
    }

    #[test]
    fn test_decode_exif_orientations_dimensions() {
        let jpeg = encode_test_jpeg(40, 20);
        for (orientation, expected) in [
            (1, (40, 20)),
            (3, (40, 20)),
            (5, (20, 40)),
            (7, (20, 40)),
            (8, (20, 40)),
        ] {
            let raster = decode_image(&with_exif_orientation(&jpeg, orientation)).unwrap();
            assert_eq!(raster.dimensions(), expected, "orientation {}", orientation);
        }
    }

    #[test]
    fn test_apply_orientation_transpose() {
        let out = apply_orientation(quad(), Orientation::Transpose).into_rgb8();
        // A C / B D
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 255]);
        assert_eq!(out.get_pixel(0, 1).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(1, 1).0, [255, 255, 0]);
    }

    #[test]
    fn test_apply_orientation_transverse() {
        let out = apply_orientation(quad(), Orientation::Transverse).into_rgb8();
        // D B / C A
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap());

        let rotated = apply_orientation(img, Orientation::Rotate90CW).into_rgb8();
        assert_eq!(rotated.dimensions(), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap());

        let flipped = apply_orientation(img, Orientation::FlipHorizontal).into_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
