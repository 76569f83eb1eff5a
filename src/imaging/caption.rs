use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;

use crate::error::GalleryError;
use crate::Result;

const CAPTION_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Load a TrueType/OpenType font for caption text
pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)?;
    let font = FontVec::try_from_vec(bytes)
        .map_err(|e| GalleryError::Font(format!("{}: {}", path.display(), e)))?;

    tracing::debug!("Loaded caption font {}", path.display());
    Ok(font)
}

/// Caption text metrics in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Glyph height
    pub size: f32,
    /// Distance between baselines of consecutive lines
    pub line_height: u32,
}

impl CaptionStyle {
    /// Vertical space needed for `lines` lines of caption
    pub fn band_height(&self, lines: usize) -> u32 {
        if lines == 0 {
            return 0;
        }
        self.line_height * lines as u32 + self.line_height / 2
    }
}

/// Draw each caption line centred horizontally in `[x, x + width)`,
/// starting at `y`
pub fn draw_caption(
    canvas: &mut RgbaImage,
    font: &FontVec,
    style: &CaptionStyle,
    caption: &str,
    x: u32,
    y: u32,
    width: u32,
) {
    let scale = PxScale::from(style.size);

    for (i, line) in caption.lines().enumerate() {
        let (text_width, _) = text_size(scale, font, line);
        let left = x + width.saturating_sub(text_width) / 2;
        let top = y + i as u32 * style.line_height;
        draw_text_mut(canvas, CAPTION_COLOR, left as i32, top as i32, scale, font, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    #[test]
    fn test_band_height() {
        let style = CaptionStyle {
            size: 40.0,
            line_height: 50,
        };
        assert_eq!(style.band_height(0), 0);
        assert_eq!(style.band_height(1), 75);
        assert_eq!(style.band_height(2), 125);
    }

    #[test]
    fn test_invalid_font_rejected() {
        let dir = TempDir::new("caption-font");
        let path = dir.write_text("broken.ttf", "not a font");

        let err = load_font(&path).unwrap_err();
        assert_eq!(err.error_code(), "FONT_ERROR");

        let missing = load_font(&dir.path().join("missing.ttf")).unwrap_err();
        assert_eq!(missing.error_code(), "IO_ERROR");
    }
}
