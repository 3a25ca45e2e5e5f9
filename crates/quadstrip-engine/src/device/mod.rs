//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for the `canvas` window
//! - configuring the Surface and allocating the depth target
//! - acquiring the single frame the scene is drawn into and presenting it

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
