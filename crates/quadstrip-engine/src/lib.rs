//! Quadstrip engine crate.
//!
//! Owns the window, the GPU device, the GL-style binding layer on top of it,
//! and the one-shot strip scene drawn through that layer.

pub mod device;
pub mod gfx;
pub mod logging;
pub mod scene;
pub mod shader;
pub mod window;
