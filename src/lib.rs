//! Pixel-processing core of the pixlab raster image editor.
//!
//! Everything operates on owned [`buffer::PixelBuffer`] values: nearest-neighbor
//! resampling, per-channel histograms, two-point tone curves applied through a
//! 256-entry LUT, and 3×3 convolution kernels. [`session::EditorSession`] holds
//! the current and original buffer and dispatches to the operations in
//! [`ops`]; [`io`] is the decode/encode boundary; [`cli`] is the headless
//! batch front end.

pub mod buffer;
pub mod cli;
pub mod io;
pub mod logger;
pub mod ops;
pub mod session;
