//! Rendering core for a small textured desk scene.
//!
//! The crate is split so that everything which does not need a GPU (vertex
//! tables, uniform packing, image decoding, the lighting formula, the frame
//! plan) can be exercised headless.  The `render` module is the only place
//! that drives a `wgpu` surface; the winit event loop lives in the binary.

pub mod app;
pub mod camera;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod time;
pub mod uniforms;

pub use camera::{Camera, CameraMovement, CameraView};
pub use error::{MeshError, SceneError, ShaderError, StartupError, TextureError};
pub use frame::{plan_frame, DrawCall, FramePlan, FrameStage};
pub use geometry::{AttributeLayout, MeshId, VertexLayout};
pub use input::{InputState, KeyCode, LookSource, MouseButton, MouseLook, MouseTracker};
pub use mesh::{MeshBuffers, MeshData, MeshSet};
pub use render::{DepthBuffer, Renderer, ScenePass};
pub use scene::{Scene, SceneConstants, SceneObject, Transform};
pub use shader::{ProgramKind, ProgramSource, ProgramTargets, ShaderProgram, ShaderStage};
pub use texture::{flip_vertically, sampler_descriptor, DecodedImage, Texture};
pub use uniforms::{UniformBlock, UniformLayout};
