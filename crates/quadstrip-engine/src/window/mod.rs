//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the `canvas` window, wires the window to
//! the GPU layer, and runs the scene initializer on the first redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
