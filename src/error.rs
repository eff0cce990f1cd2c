use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage a shader unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Failure while building a shader program.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation failed:\n{log}")]
    CompileFailed { stage: ShaderStage, log: String },
    #[error("shader program link failed:\n{log}")]
    LinkFailed { log: String },
}

/// Failure while decoding an image into texture data.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("unable to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unsupported channel layout: {channels} channel(s), expected 3 or 4")]
    UnsupportedChannelLayout { channels: u8 },
}

/// Vertex data that does not describe whole vertices or whole triangles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("vertex data is empty")]
    Empty,
    #[error("vertex data holds {len} floats, which is not a multiple of the {stride}-float stride")]
    StrideMismatch { len: usize, stride: usize },
    #[error("{vertices} vertices do not form whole triangles")]
    IncompleteTriangle { vertices: usize },
}

/// Malformed scene constant overrides.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{tag}> must hold three numbers, found {value:?}")]
    InvalidVector { tag: &'static str, value: String },
}

/// Everything that can abort the process before the first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize {stage}: {message}")]
    Init { stage: &'static str, message: String },
    #[error("invalid mesh table for {mesh}: {source}")]
    Mesh {
        mesh: &'static str,
        #[source]
        source: MeshError,
    },
    #[error("failed to load texture {}: {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: TextureError,
    },
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl StartupError {
    pub fn init(stage: &'static str, err: impl fmt::Display) -> Self {
        Self::Init {
            stage,
            message: err.to_string(),
        }
    }
}
