/// Block1 & Block2
pub mod block;
pub use block::*;

/// Content-Format & Accept values
pub mod content_format;
pub use content_format::*;
