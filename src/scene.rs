use glam::{Mat4, Vec3};
use roxmltree::{Document, Node};

use crate::error::SceneError;
use crate::geometry::MeshId;

/// Process-wide lighting values, read every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConstants {
    pub object_color: Vec3,
    pub light_color: Vec3,
    pub light_position: Vec3,
    pub light_scale: Vec3,
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self {
            object_color: default_object_color(),
            light_color: default_light_color(),
            light_position: default_light_position(),
            light_scale: default_light_scale(),
        }
    }
}

// Tinted on purpose: green below and blue above unity.
fn default_object_color() -> Vec3 {
    Vec3::new(1.0, 0.9, 1.15)
}

fn default_light_color() -> Vec3 {
    Vec3::ONE
}

fn default_light_position() -> Vec3 {
    Vec3::new(1.5, 0.5, 3.0)
}

fn default_light_scale() -> Vec3 {
    Vec3::splat(0.3)
}

impl SceneConstants {
    /// Applies the overrides found in `xml` on top of `self`.
    ///
    /// ```xml
    /// <scene>
    ///     <lightPosition>0 2 1</lightPosition>
    ///     <objectColor>1 1 1</objectColor>
    /// </scene>
    /// ```
    pub fn with_xml_overrides(self, xml: &str) -> Result<Self, SceneError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        Ok(Self {
            object_color: parse_vec3(&root, "objectColor", self.object_color)?,
            light_color: parse_vec3(&root, "lightColor", self.light_color)?,
            light_position: parse_vec3(&root, "lightPosition", self.light_position)?,
            light_scale: parse_vec3(&root, "lightScale", self.light_scale)?,
        })
    }
}

/// Model transform, composed as `translate * rotate * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation_axis: Vec3,
    /// Radians.
    pub rotation_angle: f32,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_axis: Vec3::Y,
            rotation_angle: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Placement shared by every object on the desk: pushed back, tilted
    /// 45 rad about (-90, 1, 1) and doubled in size.
    pub fn desk_layout() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, -8.0),
            rotation_axis: Vec3::new(-90.0, 1.0, 1.0),
            rotation_angle: 45.0,
            scale: Vec3::splat(2.0),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = match self.rotation_axis.try_normalize() {
            Some(axis) => Mat4::from_axis_angle(axis, self.rotation_angle),
            None => Mat4::IDENTITY,
        };
        Mat4::from_translation(self.translation) * rotation * Mat4::from_scale(self.scale)
    }
}

/// A textured, lit mesh placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub mesh: MeshId,
    /// File name relative to the asset directory.
    pub texture: String,
    pub transform: Transform,
}

/// Everything drawn each frame, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub constants: SceneConstants,
    pub objects: Vec<SceneObject>,
    /// Mesh reused as the light-source marker.
    pub lamp_mesh: MeshId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::desk(SceneConstants::default())
    }
}

impl Scene {
    /// Desk, mug and keyboard, each with its own texture.
    pub fn desk(constants: SceneConstants) -> Self {
        let objects = MeshId::ALL
            .iter()
            .map(|mesh| SceneObject {
                mesh: *mesh,
                texture: format!("{}.png", mesh.label()),
                transform: Transform::desk_layout(),
            })
            .collect();
        Self {
            constants,
            objects,
            lamp_mesh: MeshId::Mug,
        }
    }

    /// Texture file names in draw order.
    pub fn texture_files(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|object| object.texture.as_str())
    }

    /// Model matrix of the lamp marker.
    pub fn lamp_model(&self) -> Mat4 {
        Mat4::from_translation(self.constants.light_position)
            * Mat4::from_scale(self.constants.light_scale)
    }
}

fn parse_vec3(node: &Node<'_, '_>, tag: &'static str, default: Vec3) -> Result<Vec3, SceneError> {
    let Some(text) = node
        .children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
    else {
        return Ok(default);
    };
    let invalid = || SceneError::InvalidVector {
        tag,
        value: text.to_string(),
    };
    let numbers = text
        .split_whitespace()
        .map(|component| component.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(invalid()),
    }
}
