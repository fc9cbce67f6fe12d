use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

pub const MIME_IMAGE_PNG: &str = "image/png";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image data is empty")]
    Empty,
    #[error("failed to decode image: {source}")]
    Image {
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to encode {format:?} image: {source}")]
    Image {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },
}

/// Decodes any format `image` can sniff into an RGBA buffer.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| DecodeError::Image { source })
}

/// Decodes using the declared MIME type, falling back to content sniffing when
/// the type is unknown to `image` or the bytes are not in the declared format.
///
/// A failure reports the error of the declared format.
pub fn decode_image_with_mime(bytes: &[u8], mime_type: &str) -> Result<RgbaImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let Some(format) = ImageFormat::from_mime_type(mime_type.trim()) else {
        tracing::debug!(mime_type, "unknown mime type; sniffing image format");
        return decode_image(bytes);
    };
    match image::load_from_memory_with_format(bytes, format) {
        Ok(decoded) => Ok(decoded.to_rgba8()),
        Err(source) => {
            tracing::debug!(mime_type, %source, "declared format failed; sniffing image format");
            decode_image(bytes).map_err(|_| DecodeError::Image { source })
        }
    }
}

pub fn encode_image(buffer: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    let mut cursor = Cursor::new(Vec::new());
    buffer
        .write_to(&mut cursor, format)
        .map_err(|source| EncodeError::Image { format, source })?;
    Ok(cursor.into_inner())
}

pub fn encode_png(buffer: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    encode_image(buffer, ImageFormat::Png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 128])
            }
        })
    }

    #[test]
    fn png_encoding_preserves_pixels() {
        let source = checkerboard(7, 5);
        let bytes = encode_png(&source).expect("png should encode");
        let decoded = decode_image(&bytes).expect("png should decode");
        assert_eq!(decoded, source);
    }

    #[test]
    fn decode_with_mime_uses_declared_format_and_sniffs_unknown_types() {
        let bytes = encode_png(&checkerboard(3, 3)).expect("png should encode");
        assert!(decode_image_with_mime(&bytes, "image/png").is_ok());
        assert!(decode_image_with_mime(&bytes, "application/octet-stream").is_ok());
    }

    #[test]
    fn mislabelled_bytes_decode_by_their_content() {
        let source = RgbaImage::from_pixel(4, 3, image::Rgba([10, 200, 30, 255]));
        let bmp = encode_image(&source, ImageFormat::Bmp).expect("bmp should encode");
        let decoded = decode_image_with_mime(&bmp, "image/png").expect("bmp labelled png");
        assert_eq!(decoded, source);

        let rgb = image::DynamicImage::ImageRgba8(source).to_rgb8();
        let mut jpeg = Cursor::new(Vec::new());
        rgb.write_to(&mut jpeg, ImageFormat::Jpeg)
            .expect("jpeg should encode");
        let decoded = decode_image_with_mime(jpeg.get_ref(), MIME_IMAGE_PNG)
            .expect("jpeg labelled png");
        assert_eq!(decoded.dimensions(), (4, 3));
    }

    #[test]
    fn undecodable_bytes_keep_the_declared_format_error() {
        let err = decode_image_with_mime(b"not a png at all", "image/png")
            .expect_err("garbage must not decode");
        assert!(matches!(err, DecodeError::Image { .. }));
    }

    #[test]
    fn decode_rejects_empty_and_garbage_input() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(DecodeError::Image { .. })
        ));
    }
}
