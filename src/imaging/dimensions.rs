use crate::state::dataset::Dataset;
use crate::Result;

/// Read the pixel width and height of every image in the dataset
///
/// Only image headers are read. Widths and heights come back as two
/// sequences aligned with row order; the first unreadable or invalid
/// image fails the whole call.
pub fn get_dimensions(dataset: &Dataset) -> Result<(Vec<u32>, Vec<u32>)> {
    let mut widths = Vec::with_capacity(dataset.len());
    let mut heights = Vec::with_capacity(dataset.len());

    for sample in dataset.samples() {
        let (width, height) = image::image_dimensions(sample.path())?;
        widths.push(width);
        heights.push(height);
    }

    tracing::debug!("Read dimensions of {} images", widths.len());
    Ok((widths, heights))
}

/// Min/max/mean of a dataset's image sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionSummary {
    pub count: usize,
    pub min_width: u32,
    pub max_width: u32,
    pub mean_width: f64,
    pub min_height: u32,
    pub max_height: u32,
    pub mean_height: f64,
}

impl DimensionSummary {
    /// Returns None for an empty dataset
    pub fn from_dimensions(widths: &[u32], heights: &[u32]) -> Option<Self> {
        if widths.is_empty() || widths.len() != heights.len() {
            return None;
        }

        let count = widths.len();
        let mean = |values: &[u32]| values.iter().map(|&v| v as f64).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min_width: *widths.iter().min()?,
            max_width: *widths.iter().max()?,
            mean_width: mean(widths),
            min_height: *heights.iter().min()?,
            max_height: *heights.iter().max()?,
            mean_height: mean(heights),
        })
    }
}

impl std::fmt::Display for DimensionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "images: {}", self.count)?;
        writeln!(
            f,
            "width:  min {} / max {} / mean {:.1}",
            self.min_width, self.max_width, self.mean_width
        )?;
        write!(
            f,
            "height: min {} / max {} / mean {:.1}",
            self.min_height, self.max_height, self.mean_height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Sample;
    use crate::test_support::TempDir;

    #[test]
    fn test_dimensions_follow_row_order() {
        let dir = TempDir::new("dims");
        let a = dir.write_png("a.png", 30, 20);
        let b = dir.write_png("b.png", 7, 11);
        let c = dir.write_png("c.png", 64, 48);

        let dataset: Dataset = vec![Sample::new(b, 0_i64), Sample::new(c, 1_i64), Sample::new(a, 1_i64)].into();
        let (widths, heights) = get_dimensions(&dataset).unwrap();

        assert_eq!(widths, vec![7, 64, 30]);
        assert_eq!(heights, vec![11, 48, 20]);
    }

    #[test]
    fn test_empty_dataset() {
        let (widths, heights) = get_dimensions(&Dataset::default()).unwrap();
        assert!(widths.is_empty());
        assert!(heights.is_empty());
    }

    #[test]
    fn test_unreadable_image_fails() {
        let dir = TempDir::new("dims-bad");
        let good = dir.write_png("good.png", 5, 5);
        let bad = dir.write_text("bad.png", "definitely not a png");

        let dataset: Dataset = vec![Sample::new(good, 0_i64), Sample::new(bad, 1_i64)].into();
        let err = get_dimensions(&dataset).unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_DECODE_ERROR");

        let missing: Dataset = vec![Sample::new(dir.path().join("missing.png"), 0_i64)].into();
        assert!(get_dimensions(&missing).is_err());
    }

    #[test]
    fn test_summary() {
        let summary = DimensionSummary::from_dimensions(&[10, 20, 30], &[5, 5, 8]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_width, 10);
        assert_eq!(summary.max_width, 30);
        assert_eq!(summary.mean_width, 20.0);
        assert_eq!(summary.max_height, 8);
        assert_eq!(summary.mean_height, 6.0);

        assert!(DimensionSummary::from_dimensions(&[], &[]).is_none());
    }
}
