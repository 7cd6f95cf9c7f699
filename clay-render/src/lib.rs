//! # clay-render
//!
//! GPU rendering backend for Clay render commands, built on `wgpu`
//! (OpenGL ES backend by default).
//!
//! ## Architecture
//!
//! ```text
//!  &[RenderCommand] (clay-core, one frame)
//!       │
//!       ▼
//!  dispatch::build_frame()        ◀─── rect / glyph vertices, clip stack
//!       │                               (clay-text lays out glyph quads)
//!       ▼
//!  FramePlan { vertices, draws }
//!       │
//!       ▼
//!  Renderer::render_frame()       ◀─── upload, one draw per coalesced run
//! ```
//!
//! ## Crate modules
//!
//! - [`buffer`]: growable per-frame vertex storage
//! - [`transform`]: pixel → NDC
//! - [`vertex`]: vertex and uniform data types
//! - [`batch`]: rectangle and glyph vertex generation
//! - [`dispatch`]: command walk, scissor stack, draw coalescing
//! - [`pipelines`]: wgpu render pipelines (rect, text)
//! - [`context`]: GPU device/queue/surface initialisation
//! - [`config`]: renderer configuration
//! - [`renderer`]: high-level frame orchestration

pub mod batch;
pub mod buffer;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod pipelines;
pub mod renderer;
pub mod transform;
pub mod vertex;

// Re-exports for convenience
pub use buffer::{BufferError, GrowableBuffer};
pub use config::{BackendPreference, ConfigError, RendererConfig};
pub use context::{GpuContext, GpuError};
pub use dispatch::{build_frame, ClipRect, DispatchOptions, DrawCall, DrawKind, FrameError, FramePlan, FrameStats};
pub use pipelines::PipelineError;
pub use renderer::{RenderError, Renderer};
pub use transform::{to_ndc, Viewport};
pub use vertex::{RectVert, TextVert, ViewportUniform};
