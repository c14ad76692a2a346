pub mod camera;
pub mod error;
pub mod perf;
/// Splat Engine - CPU software rasterizer for colored point splats
/// Perspective projection, circular footprints, depth-gated alpha blending
pub mod rendering;
pub mod splat;

pub use camera::{Camera, CameraConfig, CameraController, CameraMovement};
pub use error::{RenderError, RenderResult};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use rendering::{DebugMode, Framebuffer, RenderConfig, RenderStats, SplatRenderer};
pub use splat::{generate_cloud, SceneConfig, Splat};
