/// Image file access
///
/// This module handles:
/// - Reading image dimensions from headers
/// - Rendering gallery thumbnails with frames
/// - Drawing caption text

pub mod caption;
pub mod dimensions;
pub mod thumbnail;
