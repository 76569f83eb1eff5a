/// Sample gallery
///
/// Picks rows from a dataset (random sample or head), lays them out on a
/// grid sized by how many thumbnails are shown, and renders each tile with
/// an optional caption and mistake highlight.

use ab_glyph::FontVec;
use image::{imageops, RgbaImage};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::GalleryError;
use crate::imaging::caption::{self, CaptionStyle};
use crate::imaging::thumbnail::{self, Frame, TileGeometry, BACKGROUND};
use crate::state::data::Sample;
use crate::state::dataset::Dataset;
use crate::Result;

/// Printed instead of a figure when there is nothing to show
pub const EMPTY_MESSAGE: &str = "Data length is zero. No image to show";

/// Frame width of a mistake highlight, in points
const MISTAKE_FRAME_POINTS: f32 = 5.0;

/// Frame width of a captioned tile, in points
const PLAIN_FRAME_POINTS: f32 = 0.8;

/// Caption font size, in points
const CAPTION_POINTS: f32 = 10.0;

const POINTS_PER_INCH: f32 = 72.0;

/// What to show and how to annotate it
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GalleryOptions {
    /// Upper bound on thumbnails shown
    pub num_images: usize,
    /// Random sample (true) or first rows in table order (false)
    pub randomize: bool,
    /// Caption with the image's file name
    pub add_name: bool,
    /// Caption with the predicted probability
    pub add_prob: bool,
    /// Highlight rows flagged as mistakes
    pub flag_mistakes: bool,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            num_images: 12,
            randomize: true,
            add_name: false,
            add_prob: false,
            flag_mistakes: false,
        }
    }
}

/// Grid layout for a given thumbnail count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
    /// Cell edge in inches
    pub cell_inches: f32,
    pub dpi: u32,
}

impl GridSpec {
    /// Small counts get big high-resolution cells; past 24 images the
    /// resolution drops to keep the figure manageable
    pub fn for_count(count: usize) -> Self {
        let (columns, cell_inches, dpi) = match count {
            0..=12 => (6, 2.5, 300),
            13..=24 => (10, 1.5, 300),
            _ => (10, 1.5, 100),
        };

        Self {
            columns,
            rows: count.div_ceil(columns),
            cell_inches,
            dpi,
        }
    }

    /// Cell edge in pixels
    pub fn cell_px(&self) -> u32 {
        (self.cell_inches * self.dpi as f32).round() as u32
    }

    fn points_to_px(&self, points: f32) -> u32 {
        (points * self.dpi as f32 / POINTS_PER_INCH).round().max(1.0) as u32
    }

    pub fn tile_geometry(&self) -> TileGeometry {
        let cell = self.cell_px();
        let mistake_width = self.points_to_px(MISTAKE_FRAME_POINTS);
        TileGeometry {
            cell,
            margin: mistake_width + cell / 40,
            plain_width: self.points_to_px(PLAIN_FRAME_POINTS),
            mistake_width,
        }
    }

    pub fn caption_style(&self) -> CaptionStyle {
        let size = CAPTION_POINTS * self.dpi as f32 / POINTS_PER_INCH;
        CaptionStyle {
            size,
            line_height: (size * 1.25).round() as u32,
        }
    }

    /// Full figure size in pixels
    pub fn figure_px(&self) -> (u32, u32) {
        let cell = self.cell_px();
        (cell * self.columns as u32, cell * self.rows as u32)
    }
}

/// One rendered cell of the gallery
#[derive(Debug, Clone)]
pub struct Tile {
    pub path: PathBuf,
    pub caption: Option<String>,
    pub frame: Frame,
    pub image: RgbaImage,
}

/// A rendered gallery, ready to display or save
#[derive(Debug, Clone)]
pub struct Gallery {
    pub grid: GridSpec,
    pub tiles: Vec<Tile>,
}

impl Gallery {
    /// Paste all tiles into a single figure, row-major, without captions
    pub fn compose(&self) -> RgbaImage {
        self.compose_rows(0, |_, _, _, _| {})
    }

    /// Like `compose`, with each caption drawn in a band under its tile
    pub fn compose_captioned(&self, font: &FontVec) -> RgbaImage {
        let style = self.grid.caption_style();
        let band = style.band_height(self.caption_lines());
        let cell = self.grid.cell_px();

        self.compose_rows(band, |figure, tile, x, y| {
            if let Some(text) = &tile.caption {
                caption::draw_caption(figure, font, &style, text, x, y + cell, cell);
            }
        })
    }

    /// Most caption lines on any tile
    pub fn caption_lines(&self) -> usize {
        self.tiles
            .iter()
            .filter_map(|tile| tile.caption.as_deref())
            .map(|text| text.lines().count())
            .max()
            .unwrap_or(0)
    }

    /// Figure size when each grid row carries a caption band
    pub fn captioned_figure_px(&self) -> (u32, u32) {
        let band = self.grid.caption_style().band_height(self.caption_lines());
        let (width, _) = self.grid.figure_px();
        (width, (self.grid.cell_px() + band) * self.grid.rows as u32)
    }

    fn compose_rows<F>(&self, band: u32, mut annotate: F) -> RgbaImage
    where
        F: FnMut(&mut RgbaImage, &Tile, u32, u32),
    {
        let cell = self.grid.cell_px();
        let row_height = cell + band;
        let width = cell * self.grid.columns as u32;
        let height = row_height * self.grid.rows as u32;
        let mut figure = RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND);

        for (i, tile) in self.tiles.iter().enumerate() {
            let x = (i % self.grid.columns) as u32 * cell;
            let y = (i / self.grid.columns) as u32 * row_height;
            imageops::overlay(&mut figure, &tile.image, x as i64, y as i64);
            annotate(&mut figure, tile, x, y);
        }

        figure
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Select and render a gallery of samples
///
/// Returns `Ok(None)` and logs an informational message when the dataset
/// is empty or zero images were requested.
pub fn show_gallery<R: Rng + ?Sized>(
    dataset: &Dataset,
    options: &GalleryOptions,
    rng: &mut R,
) -> Result<Option<Gallery>> {
    let count = options.num_images.min(dataset.len());
    if count == 0 {
        tracing::info!("{}", EMPTY_MESSAGE);
        return Ok(None);
    }

    let selected: Vec<&Sample> = if options.randomize {
        dataset.sample(count, rng)
    } else {
        dataset.head(count).iter().collect()
    };

    let grid = GridSpec::for_count(count);
    let geometry = grid.tile_geometry();
    tracing::info!(
        "Rendering {} images on a {}x{} grid ({}px cells)",
        count,
        grid.rows,
        grid.columns,
        geometry.cell
    );

    let tiles = selected
        .into_iter()
        .enumerate()
        .map(|(row, sample)| -> Result<Tile> {
            let caption = caption_for(sample, row, options)?;
            let frame = frame_for(sample, row, options, caption.is_some())?;
            let image = thumbnail::render_tile(sample.path(), &geometry, frame)?;
            Ok(Tile {
                path: sample.image_path.clone(),
                caption,
                frame,
                image,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Gallery { grid, tiles }))
}

/// Caption text: probability and/or file name, one per line
fn caption_for(sample: &Sample, row: usize, options: &GalleryOptions) -> Result<Option<String>> {
    let probability = if options.add_prob {
        let value = sample.probability.ok_or(GalleryError::MissingValue {
            column: "Probability",
            row,
        })?;
        Some(format!("{:.5}", value))
    } else {
        None
    };

    let name = options.add_name.then(|| sample.file_name());

    Ok(match (probability, name) {
        (Some(probability), Some(name)) => Some(format!("{}\n{}", probability, name)),
        (Some(probability), None) => Some(probability),
        (None, Some(name)) => Some(name),
        (None, None) => None,
    })
}

fn frame_for(
    sample: &Sample,
    row: usize,
    options: &GalleryOptions,
    has_caption: bool,
) -> Result<Frame> {
    if options.flag_mistakes {
        let is_mistake = sample.is_mistake.ok_or(GalleryError::MissingValue {
            column: "IsMistake",
            row,
        })?;
        if is_mistake {
            return Ok(Frame::Mistake);
        }
    }

    Ok(if has_caption { Frame::Plain } else { Frame::None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fixture(dir: &TempDir, count: usize) -> Dataset {
        (0..count)
            .map(|i| {
                let path = dir.write_png(&format!("img_{:03}.png", i), 8, 8);
                Sample::new(path, (i % 2) as i64)
                    .with_probability(i as f64 / 100.0)
                    .with_mistake(i % 3 == 0)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn names(gallery: &Gallery) -> Vec<String> {
        gallery
            .tiles
            .iter()
            .map(|t| t.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_grid_thresholds() {
        let small = GridSpec::for_count(12);
        assert_eq!((small.columns, small.rows, small.dpi), (6, 2, 300));
        assert_eq!(small.cell_px(), 750);

        let medium = GridSpec::for_count(13);
        assert_eq!((medium.columns, medium.rows, medium.dpi), (10, 2, 300));
        assert_eq!(medium.cell_px(), 450);

        let medium_top = GridSpec::for_count(24);
        assert_eq!((medium_top.columns, medium_top.rows, medium_top.dpi), (10, 3, 300));
        assert_eq!(medium_top.cell_px(), 450);

        let large = GridSpec::for_count(25);
        assert_eq!((large.columns, large.rows, large.dpi), (10, 3, 100));
        assert_eq!(large.cell_px(), 150);
        assert_eq!(large.figure_px(), (1500, 450));

        assert_eq!(GridSpec::for_count(1).rows, 1);
    }

    #[test]
    fn test_mistake_frame_scales_with_dpi() {
        assert_eq!(GridSpec::for_count(5).tile_geometry().mistake_width, 21);
        assert_eq!(GridSpec::for_count(30).tile_geometry().mistake_width, 7);
    }

    #[test]
    fn test_empty_dataset_produces_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let gallery = show_gallery(&Dataset::default(), &GalleryOptions::default(), &mut rng).unwrap();
        assert!(gallery.is_none());
    }

    #[test]
    fn test_zero_requested_produces_nothing() {
        let dir = TempDir::new("gallery-zero");
        let dataset = fixture(&dir, 3);
        let options = GalleryOptions {
            num_images: 0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(show_gallery(&dataset, &options, &mut rng).unwrap().is_none());
    }

    #[test]
    fn test_head_selection_in_order() {
        let dir = TempDir::new("gallery-head");
        let dataset = fixture(&dir, 6);
        let options = GalleryOptions {
            num_images: 4,
            randomize: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let gallery = show_gallery(&dataset, &options, &mut rng).unwrap().unwrap();
        assert_eq!(
            names(&gallery),
            vec!["img_000.png", "img_001.png", "img_002.png", "img_003.png"]
        );
        assert!(gallery.tiles.iter().all(|t| t.caption.is_none()));
        assert!(gallery.tiles.iter().all(|t| t.frame == Frame::None));
        assert_eq!(gallery.compose().dimensions(), gallery.grid.figure_px());
    }

    #[test]
    fn test_random_selection_is_distinct() {
        let dir = TempDir::new("gallery-random");
        let dataset = fixture(&dir, 10);
        let options = GalleryOptions {
            num_images: 7,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        let gallery = show_gallery(&dataset, &options, &mut rng).unwrap().unwrap();
        let unique: HashSet<_> = names(&gallery).into_iter().collect();
        assert_eq!(gallery.len(), 7);
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_count_capped_by_dataset() {
        let dir = TempDir::new("gallery-cap");
        let dataset = fixture(&dir, 3);
        let mut rng = StdRng::seed_from_u64(3);

        let gallery = show_gallery(&dataset, &GalleryOptions::default(), &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.grid.rows, 1);
    }

    #[test]
    fn test_captions_and_mistakes() {
        let dir = TempDir::new("gallery-captions");
        let dataset = fixture(&dir, 2);
        let options = GalleryOptions {
            num_images: 2,
            randomize: false,
            add_name: true,
            add_prob: true,
            flag_mistakes: true,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let gallery = show_gallery(&dataset, &options, &mut rng).unwrap().unwrap();
        assert_eq!(gallery.tiles[0].caption.as_deref(), Some("0.00000\nimg_000.png"));
        assert_eq!(gallery.tiles[0].frame, Frame::Mistake);
        assert_eq!(gallery.tiles[1].caption.as_deref(), Some("0.01000\nimg_001.png"));
        assert_eq!(gallery.tiles[1].frame, Frame::Plain);
    }

    #[test]
    fn test_caption_band_grows_figure() {
        let dir = TempDir::new("gallery-band");
        let dataset = fixture(&dir, 7);
        let options = GalleryOptions {
            num_images: 7,
            randomize: false,
            add_name: true,
            add_prob: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let gallery = show_gallery(&dataset, &options, &mut rng).unwrap().unwrap();
        assert_eq!(gallery.caption_lines(), 2);

        // 300 dpi: 10pt text is ~41.7px, 52px line height, band of two lines is 130px
        let style = gallery.grid.caption_style();
        assert_eq!(style.line_height, 52);
        assert_eq!(gallery.captioned_figure_px(), (6 * 750, 2 * (750 + 130)));
    }

    #[test]
    fn test_uncaptioned_figure_has_no_band() {
        let dir = TempDir::new("gallery-noband");
        let dataset = fixture(&dir, 3);
        let options = GalleryOptions {
            randomize: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let gallery = show_gallery(&dataset, &options, &mut rng).unwrap().unwrap();
        assert_eq!(gallery.caption_lines(), 0);
        assert_eq!(gallery.captioned_figure_px(), gallery.grid.figure_px());
    }

    #[test]
    fn test_single_caption_kinds() {
        let sample = Sample::new("data/superman/s1.jpg", 1_i64).with_probability(0.123456);

        let name_only = GalleryOptions {
            add_name: true,
            ..Default::default()
        };
        assert_eq!(caption_for(&sample, 0, &name_only).unwrap().as_deref(), Some("s1.jpg"));

        let prob_only = GalleryOptions {
            add_prob: true,
            ..Default::default()
        };
        assert_eq!(caption_for(&sample, 0, &prob_only).unwrap().as_deref(), Some("0.12346"));
    }

    #[test]
    fn test_missing_probability_is_error() {
        let sample = Sample::new("a.png", 1_i64);
        let options = GalleryOptions {
            add_prob: true,
            ..Default::default()
        };
        let err = caption_for(&sample, 4, &options).unwrap_err();
        assert!(matches!(
            err,
            GalleryError::MissingValue { column: "Probability", row: 4 }
        ));
    }

    #[test]
    fn test_missing_mistake_flag_is_error() {
        let sample = Sample::new("a.png", 1_i64);
        let options = GalleryOptions {
            flag_mistakes: true,
            ..Default::default()
        };
        assert!(frame_for(&sample, 0, &options, false).is_err());
    }

    #[test]
    fn test_broken_image_fails_gallery() {
        let dir = TempDir::new("gallery-broken");
        let bad = dir.write_text("bad.png", "nope");
        let dataset: Dataset = vec![Sample::new(bad, 0_i64)].into();
        let mut rng = StdRng::seed_from_u64(1);

        let err = show_gallery(&dataset, &GalleryOptions::default(), &mut rng).unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_DECODE_ERROR");
    }
}
