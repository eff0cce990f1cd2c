//! Baked vertex tables for the scene meshes.
//!
//! Every table is a flat run of interleaved floats laid out as
//! `position.xyz, color.rgb, uv, normal.xyz`. Meshes are drawn as independent
//! triangles, three vertices each, with no index buffer.

/// One vertex attribute inside an interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    /// Shader input location the attribute feeds.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
}

impl AttributeLayout {
    const fn new(location: u32, components: u32, float_offset: u64) -> Self {
        Self {
            location,
            components,
            offset: float_offset * FLOAT_SIZE,
        }
    }

    pub fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }
}

const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Ordered attribute list sharing a single stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub attributes: &'static [AttributeLayout],
    pub floats_per_vertex: usize,
}

impl VertexLayout {
    /// Position, color, uv and normal: 11 floats per vertex.
    pub const LIT: Self = Self {
        attributes: &[
            AttributeLayout::new(0, 3, 0),
            AttributeLayout::new(1, 3, 3),
            AttributeLayout::new(2, 2, 6),
            AttributeLayout::new(3, 3, 8),
        ],
        floats_per_vertex: 11,
    };

    /// Position, color and uv without normals: 8 floats per vertex.
    pub const UNLIT: Self = Self {
        attributes: &[
            AttributeLayout::new(0, 3, 0),
            AttributeLayout::new(1, 3, 3),
            AttributeLayout::new(2, 2, 6),
        ],
        floats_per_vertex: 8,
    };

    /// Byte distance between consecutive vertices.
    pub fn stride(&self) -> u64 {
        self.floats_per_vertex as u64 * FLOAT_SIZE
    }

    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: attribute.format(),
                offset: attribute.offset,
                shader_location: attribute.location,
            })
            .collect()
    }
}

/// Identifier of a baked mesh, listed in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshId {
    Desk,
    Mug,
    Keyboard,
}

impl MeshId {
    pub const ALL: [MeshId; 3] = [MeshId::Desk, MeshId::Mug, MeshId::Keyboard];

    pub fn label(self) -> &'static str {
        match self {
            MeshId::Desk => "desk",
            MeshId::Mug => "mug",
            MeshId::Keyboard => "keyboard",
        }
    }

    pub fn vertices(self) -> &'static [f32] {
        match self {
            MeshId::Desk => DESK_VERTICES,
            MeshId::Mug => MUG_VERTICES,
            MeshId::Keyboard => KEYBOARD_VERTICES,
        }
    }

    pub fn layout(self) -> VertexLayout {
        VertexLayout::LIT
    }
}

#[rustfmt::skip]
pub const DESK_VERTICES: &[f32] = &[
    // positions        // colors        // uv     // normals
    -2.0, -2.0, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -2.0, 0.0, 0.0,  0.0, 0.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
    2.0, -2.0, 0.0,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    2.0, -2.0, 0.0,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    2.0, 0.0, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  0.0, 0.0, 1.0,
    -2.0, 0.0, 0.0,  0.0, 0.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
];

#[rustfmt::skip]
pub const MUG_VERTICES: &[f32] = &[
    // left wall
    -1.7, -0.3, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  0.0, 0.0, -1.0,
    -1.7, -0.3, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, -1.0,
    -1.7, -0.4, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, -1.0,
    -1.7, -0.4, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, -1.0,
    -1.7, -0.4, 0.4,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, -1.0,
    -1.7, -0.3, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, -1.0,

    // right wall
    -1.4, -0.3, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  0.0, 0.0, 1.0,
    -1.4, -0.3, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.4,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.3, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,

    // rim
    -1.6, -0.2, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  1.0, 0.0, 0.0,
    -1.5, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  1.0, 0.0, 0.0,
    -1.5, -0.2, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.6, -0.2, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.6, -0.2, 0.4,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.5, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  1.0, 0.0, 0.0,

    // upper right bevel
    -1.5, -0.2, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  0.0, 0.0, 1.0,
    -1.5, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.3, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.3, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.3, 0.4,  0.0, 0.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.5, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,

    // upper left bevel
    -1.7, -0.3, 0.0,  0.0, 0.0, 0.0,  0.0, 0.0,  1.0, 0.0, 0.0,
    -1.6, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  1.0, 0.0, 0.0,
    -1.6, -0.2, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.7, -0.3, 0.0,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.7, -0.3, 0.4,  0.0, 0.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -1.6, -0.2, 0.4,  0.0, 0.0, 0.0,  0.0, 1.0,  1.0, 0.0, 0.0,

    // base
    -1.6, -0.5, 0.0,  1.0, 1.0, 1.0,  0.0, 0.0,  -1.0, 0.0, 0.0,
    -1.5, -0.5, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  -1.0, 0.0, 0.0,
    -1.5, -0.5, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.6, -0.5, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.6, -0.5, 0.4,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.5, -0.5, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  -1.0, 0.0, 0.0,

    // lower right bevel
    -1.5, -0.5, 0.0,  1.0, 1.0, 1.0,  0.0, 0.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.5, -0.5, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.5, -0.5, 0.4,  1.0, 1.0, 1.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    -1.4, -0.4, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  0.0, 0.0, 1.0,

    // lower left bevel
    -1.7, -0.4, 0.0,  1.0, 1.0, 1.0,  0.0, 0.0,  -1.0, 0.0, 0.0,
    -1.7, -0.4, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  -1.0, 0.0, 0.0,
    -1.6, -0.5, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.6, -0.5, 0.0,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.6, -0.5, 0.4,  1.0, 1.0, 1.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -1.7, -0.4, 0.4,  1.0, 1.0, 1.0,  0.0, 1.0,  -1.0, 0.0, 0.0,
];

#[rustfmt::skip]
pub const KEYBOARD_VERTICES: &[f32] = &[
    // right edge
    1.0, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    1.0, -1.8, 0.0,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
    1.0, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    1.0, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,

    // left edge
    -0.5, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  0.0, 0.0, -1.0,
    -0.5, -1.8, 0.0,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, -1.0,
    -0.5, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, -1.0,
    -0.5, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  0.0, 0.0, -1.0,
    -0.5, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, -1.0,
    -0.5, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, -1.0,

    // upper edge
    -0.5, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -0.5, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  1.0, 0.0, 0.0,
    1.0, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  1.0, 0.0, 0.0,
    1.0, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  1.0, 0.0, 0.0,
    -0.5, -1.2, 0.0,  0.0, 1.0, 0.0,  1.0, 0.0,  1.0, 0.0, 0.0,
    1.0, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  1.0, 0.0, 0.0,

    // lower edge
    -0.5, -1.8, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -0.5, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  -1.0, 0.0, 0.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  -1.0, 0.0, 0.0,
    1.0, -1.8, 0.0,  0.0, 1.0, 0.0,  1.0, 1.0,  -1.0, 0.0, 0.0,
    -0.5, -1.8, 0.0,  0.0, 1.0, 0.0,  1.0, 0.0,  -1.0, 0.0, 0.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  -1.0, 0.0, 0.0,

    // top face
    -0.5, -1.2, 0.1,  0.0, 1.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    1.0, -1.2, 0.1,  0.0, 1.0, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
    -0.5, -1.2, 0.1,  0.0, 1.0, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
    -0.5, -1.8, 0.1,  0.0, 1.0, 0.0,  0.0, 0.0,  0.0, 0.0, 1.0,
    1.0, -1.8, 0.1,  0.0, 1.0, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_count(mesh: MeshId) -> usize {
        let layout = mesh.layout();
        assert_eq!(mesh.vertices().len() % layout.floats_per_vertex, 0);
        mesh.vertices().len() / layout.floats_per_vertex
    }

    #[test]
    fn tables_hold_whole_triangles() {
        assert_eq!(vertex_count(MeshId::Desk), 6);
        assert_eq!(vertex_count(MeshId::Mug), 48);
        assert_eq!(vertex_count(MeshId::Keyboard), 30);
        for mesh in MeshId::ALL {
            assert_eq!(vertex_count(mesh) % 3, 0, "{}", mesh.label());
        }
    }

    #[test]
    fn lit_layout_matches_interleaving() {
        let layout = VertexLayout::LIT;
        assert_eq!(layout.stride(), 44);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);
        let covered: u32 = layout.attributes.iter().map(|a| a.components).sum();
        assert_eq!(covered as usize, layout.floats_per_vertex);
    }

    #[test]
    fn unlit_layout_drops_normals() {
        let layout = VertexLayout::UNLIT;
        assert_eq!(layout.stride(), 32);
        assert!(layout.attributes.iter().all(|a| a.location != 3));
    }

    #[test]
    fn normals_are_unit_length() {
        for mesh in MeshId::ALL {
            for vertex in mesh.vertices().chunks_exact(11) {
                let normal = glam::Vec3::from_slice(&vertex[8..11]);
                assert!((normal.length() - 1.0).abs() < 1e-6, "{}", mesh.label());
            }
        }
    }
}
