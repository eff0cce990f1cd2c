use std::collections::BTreeMap;

use log::debug;
use wgpu::util::DeviceExt;

use crate::error::MeshError;
use crate::geometry::{MeshId, VertexLayout};

/// Interleaved vertex data checked against its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<f32>,
    layout: VertexLayout,
}

impl MeshData {
    /// Validates that `vertices` holds whole vertices forming whole triangles.
    pub fn new(vertices: Vec<f32>, layout: VertexLayout) -> Result<Self, MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        let stride = layout.floats_per_vertex;
        if vertices.len() % stride != 0 {
            return Err(MeshError::StrideMismatch {
                len: vertices.len(),
                stride,
            });
        }
        let count = vertices.len() / stride;
        if count % 3 != 0 {
            return Err(MeshError::IncompleteTriangle { vertices: count });
        }
        Ok(Self { vertices, layout })
    }

    /// Builds the data for one of the baked scene meshes.
    pub fn baked(mesh: MeshId) -> Result<Self, MeshError> {
        Self::new(mesh.vertices().to_vec(), mesh.layout())
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Derived from the float count; never stored separately.
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.layout.floats_per_vertex) as u32
    }
}

/// GPU vertex buffer plus the count needed to draw it.
pub struct MeshBuffers {
    vertex: wgpu::Buffer,
    vertex_count: u32,
    layout: VertexLayout,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        debug!(
            "uploaded {label}: {} vertices, {}-byte stride",
            mesh.vertex_count(),
            mesh.layout().stride()
        );
        Self {
            vertex,
            vertex_count: mesh.vertex_count(),
            layout: mesh.layout(),
        }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn destroy(self) {
        self.vertex.destroy();
    }
}

/// Uploaded meshes keyed by identifier.
#[derive(Default)]
pub struct MeshSet {
    meshes: BTreeMap<MeshId, MeshBuffers>,
}

impl MeshSet {
    /// Validates and uploads every baked mesh.
    pub fn upload_all(device: &wgpu::Device) -> Result<Self, (MeshId, MeshError)> {
        let mut meshes = BTreeMap::new();
        for id in MeshId::ALL {
            let data = MeshData::baked(id).map_err(|err| (id, err))?;
            meshes.insert(id, MeshBuffers::upload(device, &data, id.label()));
        }
        Ok(Self { meshes })
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshBuffers> {
        self.meshes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn destroy(self) {
        for (_, mesh) in self.meshes {
            mesh.destroy();
        }
    }
}
