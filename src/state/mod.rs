/// Dataset state
///
/// This module handles the caller-owned sample table:
/// - Row and label types (data.rs)
/// - Loading, saving, selection and path rewriting (dataset.rs)

pub mod data;
pub mod dataset;
