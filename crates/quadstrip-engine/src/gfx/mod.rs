//! Typed graphics binding layer.
//!
//! `GfxContext` exposes a GL-flavored, state-machine style API (create, bind,
//! upload, enable, draw) over opaque typed handles. The actual GPU work sits
//! behind the [`Backend`] trait:
//! - [`WgpuBackend`] renders into the window surface
//! - [`RecordingBackend`] keeps uploads and draws in memory
//!
//! Clears are deferred: `clear` records what the next draw must clear, and the
//! backend folds it into that draw's load operations.

mod backend;
mod context;
mod error;
mod handle;
mod recording;
mod types;
mod wgpu_backend;

pub use backend::{Backend, DrawSubmission, PendingClear, UniformUpload, VertexInput};
pub use context::GfxContext;
pub use error::GfxError;
pub use handle::{AttribLocation, BufferId, ProgramId, ShaderId, UniformLocation};
pub use recording::{BufferUpload, DrawRecord, RecordingBackend};
pub use types::{
    AttribLayout, AttribType, BufferTarget, BufferUsage, Capability, ClearMask, Color, DepthFunc,
    Topology,
};
pub use wgpu_backend::WgpuBackend;
