use std::collections::HashMap;
use std::fmt;

use crate::state::data::Label;
use crate::state::dataset::Dataset;

/// Default name used in label summaries
pub const DEFAULT_NAME: &str = "Data";

/// Rows per distinct label, most frequent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCounts {
    pub counts: Vec<(Label, usize)>,
}

impl LabelCounts {
    /// Ties keep the order in which labels first appear in the table
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut index: HashMap<&Label, usize> = HashMap::new();
        let mut counts: Vec<(Label, usize)> = Vec::new();

        for sample in dataset.samples() {
            match index.get(&sample.label) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(&sample.label, counts.len());
                    counts.push((sample.label.clone(), 1));
                }
            }
        }

        // stable sort keeps first-appearance order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Self { counts }
    }

    pub fn get(&self, label: &Label) -> Option<usize> {
        self.counts
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .counts
            .iter()
            .map(|(label, _)| label.to_string().len())
            .max()
            .unwrap_or(0);
        let count_width = self
            .counts
            .iter()
            .map(|(_, count)| count.to_string().len())
            .max()
            .unwrap_or(0);

        for (label, count) in &self.counts {
            writeln!(
                f,
                "{:<lw$}    {:>cw$}",
                label.to_string(),
                count,
                lw = label_width,
                cw = count_width
            )?;
        }
        Ok(())
    }
}

/// Format the per-label row counts of a dataset under a heading
pub fn label_counts(dataset: &Dataset, name: &str) -> String {
    format!("{} label counts:\n{}\n", name, LabelCounts::from_dataset(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Sample;

    fn dataset(labels: &[i64]) -> Dataset {
        labels
            .iter()
            .enumerate()
            .map(|(i, &label)| Sample::new(format!("{}.png", i), label))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_most_frequent_first() {
        let counts = LabelCounts::from_dataset(&dataset(&[0, 1, 1, 0, 1]));
        assert_eq!(
            counts.counts,
            vec![(Label::Int(1), 3), (Label::Int(0), 2)]
        );
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get(&Label::Int(0)), Some(2));
        assert_eq!(counts.get(&Label::Int(7)), None);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let counts = LabelCounts::from_dataset(&dataset(&[1, 0, 0, 1]));
        assert_eq!(counts.counts, vec![(Label::Int(1), 2), (Label::Int(0), 2)]);
    }

    #[test]
    fn test_summary_text() {
        let text = label_counts(&dataset(&[1, 1, 1, 0]), "Training");
        assert!(text.contains("Training"));
        assert_eq!(text, "Training label counts:\n1    3\n0    1\n\n");
    }

    #[test]
    fn test_empty_dataset() {
        let text = label_counts(&Dataset::default(), DEFAULT_NAME);
        assert_eq!(text, "Data label counts:\n\n");
    }
}
