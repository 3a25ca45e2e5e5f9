//! The strip scene: camera, geometry and the one-shot initializer that
//! compiles, links, uploads and draws it.

mod camera;
mod error;
mod geometry;
mod initializer;
mod notify;

pub use camera::{aspect_ratio, Camera, CameraConfig};
pub use error::InitError;
pub use geometry::{COMPONENTS_PER_VERTEX, STRIP_POSITIONS, VERTEX_COUNT};
pub use initializer::{Scene, SceneConfig, SceneInitializer};
pub use notify::{DialogNotifier, Notifier};
