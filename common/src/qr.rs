//! QR encoding for batch labels and decoding of camera frames.

use qrcode::render::svg;
use qrcode::{Color, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("value cannot be encoded as a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("no QR code found in image")]
    NotFound,
    #[error("QR code could not be read: {0}")]
    Decode(String),
    #[error("image buffer is {got} bytes, expected {expected}")]
    BadImage { expected: usize, got: usize },
}

/// Square module grid; `true` is a dark module. No quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(value: &str) -> Result<Self, QrError> {
        let code = QrCode::new(value.as_bytes())?;
        let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Ok(Self {
            width: code.width(),
            modules,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Row-major 8-bit greyscale raster, `scale` pixels per module and a
    /// `quiet` module margin on every side. Returns the raster and its side.
    pub fn to_greyscale(&self, scale: usize, quiet: usize) -> (Vec<u8>, usize) {
        let scale = scale.max(1);
        let side = (self.width + 2 * quiet) * scale;
        let mut pixels = vec![255u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let mx = (x / scale).checked_sub(quiet);
                let my = (y / scale).checked_sub(quiet);
                if let (Some(mx), Some(my)) = (mx, my) {
                    if self.is_dark(mx, my) {
                        pixels[y * side + x] = 0;
                    }
                }
            }
        }
        (pixels, side)
    }
}

/// Render `value` as an SVG document at least `size` pixels square.
pub fn render_svg(value: &str, size: u32) -> Result<String, QrError> {
    let code = QrCode::new(value.as_bytes())?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Decode the first readable QR code in a greyscale frame.
pub fn decode_greyscale(width: usize, height: usize, pixels: &[u8]) -> Result<String, QrError> {
    let expected = width * height;
    if pixels.len() != expected {
        return Err(QrError::BadImage {
            expected,
            got: pixels.len(),
        });
    }
    let mut img = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        pixels[y * width + x]
    });
    let grids = img.detect_grids();
    if grids.is_empty() {
        return Err(QrError::NotFound);
    }
    let mut last_err = None;
    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => return Ok(content),
            Err(e) => last_err = Some(format!("{e:?}")),
        }
    }
    Err(QrError::Decode(last_err.unwrap_or_default()))
}

/// Decode an RGBA frame, as handed over by a canvas, by converting to luma.
pub fn decode_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<String, QrError> {
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(QrError::BadImage {
            expected,
            got: rgba.len(),
        });
    }
    let grey: Vec<u8> = rgba
        .chunks_exact(4)
        .map(|p| ((u32::from(p[0]) * 299 + u32::from(p[1]) * 587 + u32::from(p[2]) * 114) / 1000) as u8)
        .collect();
    decode_greyscale(width, height, &grey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &str) -> String {
        let matrix = QrMatrix::encode(value).unwrap();
        let (pixels, side) = matrix.to_greyscale(8, 4);
        decode_greyscale(side, side, &pixels).unwrap()
    }

    #[test]
    fn test_round_trip_tracking_url() {
        let url = "https://synerharvest.com/tracking/APL-20240301-042";
        assert_eq!(round_trip(url), url);
    }

    #[test]
    fn test_round_trip_bare_code() {
        assert_eq!(round_trip("TOM-20231111-007"), "TOM-20231111-007");
    }

    #[test]
    fn test_rgba_round_trip() {
        let matrix = QrMatrix::encode("CAR-20240302-900").unwrap();
        let (grey, side) = matrix.to_greyscale(6, 4);
        let rgba: Vec<u8> = grey.iter().flat_map(|&g| [g, g, g, 255]).collect();
        assert_eq!(decode_rgba(side, side, &rgba).unwrap(), "CAR-20240302-900");
    }

    #[test]
    fn test_blank_image_has_no_code() {
        let pixels = vec![255u8; 64 * 64];
        assert!(matches!(decode_greyscale(64, 64, &pixels), Err(QrError::NotFound)));
    }

    #[test]
    fn test_wrong_buffer_size() {
        assert!(matches!(
            decode_greyscale(10, 10, &[0u8; 5]),
            Err(QrError::BadImage { expected: 100, got: 5 })
        ));
    }

    #[test]
    fn test_svg_output() {
        let svg = render_svg("https://synerharvest.com/tracking/X", 200).unwrap();
        assert!(svg.contains("<svg"));
        let matrix = QrMatrix::encode("X").unwrap();
        assert_eq!(matrix.width(), 21);
    }
}
