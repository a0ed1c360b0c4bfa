//! Rendering backend abstraction and implementations.

pub mod chooser;
pub mod headless;
pub mod traits;
pub mod types;

pub use chooser::ConfigRequirements;
pub use headless::{HeadlessBackend, HeadlessProbe, HeadlessWindow};
pub use traits::{BackendError, BackendResult, RenderBackend, TextureHandle};
pub use types::*;
