/// Viewer window for rendered galleries

pub mod viewer;
