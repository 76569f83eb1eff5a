use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

use crate::Result;

/// Tile background
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Plain frame drawn around captioned tiles
const FRAME_COLOR: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Highlight drawn around misclassified samples
const MISTAKE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Border drawn around a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Axis off: image only
    None,
    /// Thin frame, shown when the tile has a caption
    Plain,
    /// Thick red frame for mistakes
    Mistake,
}

/// Pixel geometry of one gallery cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    /// Cell edge length (square)
    pub cell: u32,
    /// Space kept free around the image for the frame
    pub margin: u32,
    /// Width of a plain frame
    pub plain_width: u32,
    /// Width of a mistake frame
    pub mistake_width: u32,
}

impl TileGeometry {
    fn frame_width(&self, frame: Frame) -> u32 {
        match frame {
            Frame::None => 0,
            Frame::Plain => self.plain_width,
            Frame::Mistake => self.mistake_width,
        }
    }
}

/// Render one gallery tile: the image scaled to fit the cell, centred,
/// with its frame drawn just outside the image bounds
pub fn render_tile(path: &Path, geometry: &TileGeometry, frame: Frame) -> Result<RgbaImage> {
    let source = image::open(path)?;

    let inner = geometry.cell.saturating_sub(2 * geometry.margin).max(1);
    let thumbnail = source.resize(inner, inner, FilterType::Lanczos3).to_rgba8();

    let mut tile = RgbaImage::from_pixel(geometry.cell, geometry.cell, BACKGROUND);
    let x = (geometry.cell - thumbnail.width()) / 2;
    let y = (geometry.cell - thumbnail.height()) / 2;
    imageops::overlay(&mut tile, &thumbnail, x as i64, y as i64);

    let width = geometry.frame_width(frame);
    if width > 0 {
        let color = match frame {
            Frame::Mistake => MISTAKE_COLOR,
            _ => FRAME_COLOR,
        };
        draw_frame(&mut tile, x, y, thumbnail.width(), thumbnail.height(), width, color);
    }

    tracing::debug!("🖼️  Rendered tile for {}", path.display());
    Ok(tile)
}

/// Draw `width` nested outlines growing outward from the image rectangle
fn draw_frame(
    tile: &mut RgbaImage,
    x: u32,
    y: u32,
    image_width: u32,
    image_height: u32,
    width: u32,
    color: Rgba<u8>,
) {
    for step in 1..=width {
        let left = x as i32 - step as i32;
        let top = y as i32 - step as i32;
        let rect = Rect::at(left, top).of_size(image_width + 2 * step, image_height + 2 * step);
        draw_hollow_rect_mut(tile, rect, color);
    }
}
