//! Named uniform slots packed into per-draw uniform buffers.
//!
//! Programs look their uniforms up by name, the way a GL program resolves
//! uniform locations. Writing a name the program does not declare is a no-op,
//! so a frame never fails because one program lacks a uniform another has.

use glam::{Mat3, Mat4, Vec3};
use log::trace;

/// Shape of a uniform slot, sized with WGSL uniform-buffer padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Mat4,
    Mat3,
    Vec3,
}

impl UniformKind {
    pub const fn size(self) -> usize {
        match self {
            UniformKind::Mat4 => 64,
            // three 16-byte columns
            UniformKind::Mat3 => 48,
            UniformKind::Vec3 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub offset: usize,
    pub kind: UniformKind,
}

impl UniformSlot {
    const fn new(name: &'static str, offset: usize, kind: UniformKind) -> Self {
        Self { name, offset, kind }
    }
}

/// Byte layout of one program's uniform struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLayout {
    pub label: &'static str,
    pub slots: &'static [UniformSlot],
    pub size: usize,
}

impl UniformLayout {
    pub fn slot(&self, name: &str) -> Option<&UniformSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

/// Mirrors `LitUniforms` in the lit vertex and fragment stages.
pub const LIT_UNIFORMS: UniformLayout = UniformLayout {
    label: "lit",
    slots: &[
        UniformSlot::new("model", 0, UniformKind::Mat4),
        UniformSlot::new("view", 64, UniformKind::Mat4),
        UniformSlot::new("projection", 128, UniformKind::Mat4),
        UniformSlot::new("normalMatrix", 192, UniformKind::Mat3),
        UniformSlot::new("objectColor", 240, UniformKind::Vec3),
        UniformSlot::new("lightColor", 256, UniformKind::Vec3),
        UniformSlot::new("lightPos", 272, UniformKind::Vec3),
        UniformSlot::new("viewPosition", 288, UniformKind::Vec3),
    ],
    size: 304,
};

/// Mirrors `LampUniforms` in the lamp vertex stage.
pub const LAMP_UNIFORMS: UniformLayout = UniformLayout {
    label: "lamp",
    slots: &[
        UniformSlot::new("model", 0, UniformKind::Mat4),
        UniformSlot::new("view", 64, UniformKind::Mat4),
        UniformSlot::new("projection", 128, UniformKind::Mat4),
    ],
    size: 192,
};

/// CPU staging copy of a uniform buffer.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        Self {
            layout,
            bytes: vec![0; layout.size],
        }
    }

    pub fn layout(&self) -> UniformLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `false` when the program has no such matrix uniform.
    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> bool {
        self.write(name, UniformKind::Mat4, bytemuck::cast_slice(&value.to_cols_array()))
    }

    pub fn set_mat3(&mut self, name: &str, value: Mat3) -> bool {
        let columns = [
            value.x_axis.extend(0.0).to_array(),
            value.y_axis.extend(0.0).to_array(),
            value.z_axis.extend(0.0).to_array(),
        ];
        self.write(name, UniformKind::Mat3, bytemuck::cast_slice(&columns))
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> bool {
        self.write(name, UniformKind::Vec3, bytemuck::cast_slice(&value.extend(1.0).to_array()))
    }

    fn write(&mut self, name: &str, kind: UniformKind, data: &[u8]) -> bool {
        let Some(slot) = self.layout.slot(name) else {
            trace!("{} program has no uniform named {name}", self.layout.label);
            return false;
        };
        if slot.kind != kind {
            trace!(
                "{} uniform {name} is {:?}, ignoring {:?} write",
                self.layout.label,
                slot.kind,
                kind
            );
            return false;
        }
        debug_assert_eq!(data.len(), kind.size());
        self.bytes[slot.offset..slot.offset + data.len()].copy_from_slice(data);
        true
    }

    #[cfg(test)]
    pub(crate) fn read_floats(&self, name: &str) -> Option<Vec<f32>> {
        let slot = self.layout.slot(name)?;
        let bytes = &self.bytes[slot.offset..slot.offset + slot.kind.size()];
        Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(layout: UniformLayout) {
        assert_eq!(layout.size % 16, 0);
        let mut end = 0;
        for slot in layout.slots {
            assert!(slot.offset >= end, "{} overlaps", slot.name);
            assert_eq!(slot.offset % 16, 0);
            end = slot.offset + slot.kind.size();
        }
        assert!(end <= layout.size);
    }

    #[test]
    fn layouts_are_aligned_and_disjoint() {
        assert_well_formed(LIT_UNIFORMS);
        assert_well_formed(LAMP_UNIFORMS);
    }

    #[test]
    fn matrices_are_written_column_major() {
        let mut block = UniformBlock::new(LAMP_UNIFORMS);
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(block.set_mat4("model", model));
        let floats = block.read_floats("model").unwrap();
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn unknown_uniform_is_ignored() {
        let mut block = UniformBlock::new(LAMP_UNIFORMS);
        let before = block.as_bytes().to_vec();
        assert!(!block.set_vec3("lightPos", Vec3::ONE));
        assert_eq!(block.as_bytes(), before.as_slice());
    }

    #[test]
    fn kind_mismatch_is_ignored() {
        let mut block = UniformBlock::new(LIT_UNIFORMS);
        assert!(!block.set_vec3("model", Vec3::ONE));
        assert!(block.read_floats("model").unwrap().iter().all(|f| *f == 0.0));
    }

    #[test]
    fn mat3_columns_are_padded() {
        let mut block = UniformBlock::new(LIT_UNIFORMS);
        assert!(block.set_mat3("normalMatrix", Mat3::from_diagonal(Vec3::new(2.0, 3.0, 4.0))));
        let floats = block.read_floats("normalMatrix").unwrap();
        assert_eq!(floats, vec![2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 4.0, 0.0]);
    }

    #[test]
    fn vec3_lands_in_its_slot() {
        let mut block = UniformBlock::new(LIT_UNIFORMS);
        assert!(block.set_vec3("viewPosition", Vec3::new(0.0, 0.0, 3.0)));
        let floats = block.read_floats("viewPosition").unwrap();
        assert_eq!(&floats[..3], &[0.0, 0.0, 3.0]);
    }
}
