//! Domain models

pub mod aspect;
pub mod video;

pub use aspect::{AspectClass, StreamGeometry};
pub use video::VideoRecord;
