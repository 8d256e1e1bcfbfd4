// Scratch card: drag to scratch off an opaque layer and reveal a picture.
// Visual: mask.rs is the card face, gesture.rs turns drags into strokes,
// percent.rs measures what is gone on a worker thread, and view.rs bundles
// them for the window host in main.rs.

pub mod compose;
pub mod config;
pub mod draw;
pub mod error;
pub mod gamma;
pub mod gesture;
pub mod logging;
pub mod mask;
pub mod percent;
pub mod types;
pub mod view;
pub mod watermark;

pub use error::{Error, MaskError};
pub use types::{Argb, FrameBuffer, Point};
pub use view::{ScratchView, ViewOptions};
