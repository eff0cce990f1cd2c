//! Command-line options, window settings and the headless scene summary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use winit::dpi::LogicalSize;

use crate::error::StartupError;
use crate::geometry::MeshId;
use crate::mesh::MeshData;
use crate::scene::{Scene, SceneConstants};
use crate::texture::{mip_level_count, DecodedImage};

pub const USAGE: &str = "Usage: desk-scene [--assets <dir>] [--scene <file.xml>] [--summary-only]";

/// Window the interactive mode opens.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Project: My 3D Space".to_string(),
            size: LogicalSize::new(800.0, 600.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub assets: PathBuf,
    pub scene: Option<PathBuf>,
    pub summary_only: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            scene: None,
            summary_only: false,
        }
    }
}

impl CliOptions {
    /// Parses arguments that follow the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--assets" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--assets needs a directory. {USAGE}"))?;
                    options.assets = PathBuf::from(dir);
                }
                "--scene" => {
                    let file = args
                        .next()
                        .ok_or_else(|| anyhow!("--scene needs a file. {USAGE}"))?;
                    options.scene = Some(PathBuf::from(file));
                }
                "--summary-only" => options.summary_only = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }

    /// Builds the scene, applying the `--scene` overrides when given.
    pub fn load_scene(&self) -> Result<Scene> {
        let mut constants = SceneConstants::default();
        if let Some(path) = &self.scene {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene file {}", path.display()))?;
            constants = constants
                .with_xml_overrides(&xml)
                .with_context(|| format!("failed to parse scene file {}", path.display()))?;
        }
        Ok(Scene::desk(constants))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshSummary {
    pub mesh: MeshId,
    pub vertex_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSummary {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// What the headless mode validated and reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSummary {
    pub meshes: Vec<MeshSummary>,
    pub textures: Vec<TextureSummary>,
    pub constants: SceneConstants,
    pub lamp_mesh: MeshId,
}

impl AppSummary {
    /// Validates every mesh table and decodes every texture on the CPU.
    pub fn collect(scene: &Scene, asset_dir: &Path) -> Result<Self, StartupError> {
        let meshes = MeshId::ALL
            .into_iter()
            .map(|mesh| {
                let data = MeshData::baked(mesh).map_err(|source| StartupError::Mesh {
                    mesh: mesh.label(),
                    source,
                })?;
                Ok(MeshSummary {
                    mesh,
                    vertex_count: data.vertex_count(),
                })
            })
            .collect::<Result<Vec<_>, StartupError>>()?;

        let textures = scene
            .texture_files()
            .map(|file| {
                let path = asset_dir.join(file);
                let image = DecodedImage::from_path(&path)
                    .map_err(|source| StartupError::TextureLoad { path, source })?;
                Ok(TextureSummary {
                    file: file.to_string(),
                    width: image.width(),
                    height: image.height(),
                    channels: image.channels(),
                })
            })
            .collect::<Result<Vec<_>, StartupError>>()?;

        Ok(Self {
            meshes,
            textures,
            constants: scene.constants,
            lamp_mesh: scene.lamp_mesh,
        })
    }
}

impl fmt::Display for AppSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Meshes:")?;
        for mesh in &self.meshes {
            writeln!(f, " - {}: {} vertices", mesh.mesh.label(), mesh.vertex_count)?;
        }
        writeln!(f, "Textures:")?;
        for texture in &self.textures {
            writeln!(
                f,
                " - {}: {}x{}, {} channel(s), {} mip level(s)",
                texture.file,
                texture.width,
                texture.height,
                texture.channels,
                mip_level_count(texture.width, texture.height)
            )?;
        }
        let c = &self.constants;
        writeln!(
            f,
            "Object color: ({:.2}, {:.2}, {:.2})",
            c.object_color.x, c.object_color.y, c.object_color.z
        )?;
        writeln!(
            f,
            "Light color: ({:.2}, {:.2}, {:.2})",
            c.light_color.x, c.light_color.y, c.light_color.z
        )?;
        write!(
            f,
            "Lamp: {} mesh at ({:.2}, {:.2}, {:.2}), scale ({:.2}, {:.2}, {:.2})",
            self.lamp_mesh.label(),
            c.light_position.x,
            c.light_position.y,
            c.light_position.z,
            c.light_scale.x,
            c.light_scale.y,
            c.light_scale.z
        )
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let options = CliOptions::parse(Vec::new()).unwrap();
        assert_eq!(options, CliOptions::default());
        assert_eq!(options.assets, PathBuf::from("assets"));
    }

    #[test]
    fn parses_every_flag() {
        let options =
            CliOptions::parse(args(&["--summary-only", "--assets", "res", "--scene", "s.xml"]))
                .unwrap();
        assert!(options.summary_only);
        assert_eq!(options.assets, PathBuf::from("res"));
        assert_eq!(options.scene, Some(PathBuf::from("s.xml")));
    }

    #[test]
    fn rejects_unknown_and_incomplete_arguments() {
        let err = CliOptions::parse(args(&["--fullscreen"])).unwrap_err();
        assert!(err.to_string().starts_with("Unknown argument: --fullscreen"));
        assert!(CliOptions::parse(args(&["--assets"])).is_err());
    }

    #[test]
    fn window_matches_project_title() {
        let window = WindowConfig::default();
        assert_eq!(window.title, "Project: My 3D Space");
        assert_eq!(window.size, LogicalSize::new(800.0, 600.0));
    }

    #[test]
    fn summary_reports_meshes_and_textures() {
        let dir = tempdir().unwrap();
        RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]))
            .save(dir.path().join("desk.png"))
            .unwrap();
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 4]))
            .save(dir.path().join("mug.png"))
            .unwrap();
        RgbImage::new(1, 1).save(dir.path().join("keyboard.png")).unwrap();

        let summary = AppSummary::collect(&Scene::default(), dir.path()).unwrap();
        let counts: Vec<u32> = summary.meshes.iter().map(|m| m.vertex_count).collect();
        assert_eq!(counts, vec![6, 48, 30]);
        assert_eq!(summary.textures[1].channels, 4);

        let text = summary.to_string();
        assert!(text.contains(" - desk: 6 vertices"));
        assert!(text.contains(" - mug.png: 8x8, 4 channel(s), 4 mip level(s)"));
        assert!(text.contains("Lamp: mug mesh at (1.50, 0.50, 3.00)"));
    }

    #[test]
    fn missing_texture_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let err = AppSummary::collect(&Scene::default(), dir.path()).unwrap_err();
        match err {
            StartupError::TextureLoad { path, .. } => assert!(path.ends_with("desk.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scene_file_overrides_constants() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("scene.xml");
        fs::write(&file, "<scene><lightPosition>0 4 0</lightPosition></scene>").unwrap();
        let options = CliOptions {
            scene: Some(file),
            ..CliOptions::default()
        };
        let scene = options.load_scene().unwrap();
        assert_eq!(scene.constants.light_position, glam::Vec3::new(0.0, 4.0, 0.0));
    }
}
