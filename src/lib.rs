pub mod config;
pub mod error;
pub mod gallery;
pub mod imaging;
pub mod state;
pub mod summary;

pub use config::Config;
pub use error::GalleryError;
pub use gallery::{show_gallery, Gallery, GalleryOptions, GridSpec, Tile};
pub use imaging::dimensions::{get_dimensions, DimensionSummary};
pub use imaging::thumbnail::Frame;
pub use state::data::{Label, Sample};
pub use state::dataset::{Dataset, PathRewrite};
pub use summary::{label_counts, LabelCounts};

pub type Result<T> = std::result::Result<T, GalleryError>;
