mod depth;
mod renderer;
mod scene_pass;

pub use depth::DepthBuffer;
pub use renderer::Renderer;
pub use scene_pass::ScenePass;
