use super::Obs;
use crate::error::OrionError;
use anyhow::Result;

/// A grayscale frame as rendered by a pixel environment.
///
/// Pixels are stored row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Number of rows.
    pub height: usize,

    /// Number of columns.
    pub width: usize,

    /// Pixel intensities in `[0, 255]`.
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// Constructs a frame, checking that the number of pixels matches the shape.
    pub fn new(height: usize, width: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != height * width {
            return Err(OrionError::ShapeMismatch(format!(
                "{} pixels for a {}x{} frame",
                pixels.len(),
                height,
                width
            ))
            .into());
        }
        Ok(Self {
            height,
            width,
            pixels,
        })
    }

    /// A black frame.
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            pixels: vec![0; height * width],
        }
    }

    /// Returns the pixel at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.pixels[row * self.width + col]
    }
}

impl AsRef<RawFrame> for RawFrame {
    fn as_ref(&self) -> &RawFrame {
        self
    }
}

impl Obs for RawFrame {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_shape() {
        assert!(RawFrame::new(2, 3, vec![0; 6]).is_ok());
        assert!(RawFrame::new(2, 3, vec![0; 5]).is_err());
    }

    #[test]
    fn test_get() {
        let frame = RawFrame::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(frame.get(1, 0), 3);
    }
}
