//! Vertex format and GPU buffers for triangle meshes

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use kitcrate_core::{TriangleMesh, Vector3f};

use crate::GpuContext;

/// Vertex data for lit, textured rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SceneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Layout reading only the position, for the depth-only shadow pass
    pub fn position_desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ATTRIBUTES,
        }
    }
}

/// Smooth normals from area-weighted face normals, for meshes without their own
fn accumulate_normals(mesh: &TriangleMesh) -> Vec<Vector3f> {
    let mut normals = vec![Vector3f::zeros(); mesh.vertices.len()];
    for face in &mesh.faces {
        let v0 = mesh.vertices[face[0]];
        let weighted = (mesh.vertices[face[1]] - v0).cross(&(mesh.vertices[face[2]] - v0));
        for &i in face {
            normals[i] += weighted;
        }
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::y))
        .collect()
}

/// Interleave a mesh's attributes; missing UVs become zero
pub fn mesh_vertices(mesh: &TriangleMesh) -> Vec<SceneVertex> {
    let computed;
    let normals = match &mesh.normals {
        Some(normals) => normals,
        None => {
            computed = accumulate_normals(mesh);
            &computed
        }
    };

    mesh.vertices
        .iter()
        .enumerate()
        .map(|(i, p)| SceneVertex {
            position: [p.x, p.y, p.z],
            normal: normals[i].into(),
            uv: mesh.uvs.as_ref().map(|uvs| uvs[i]).unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Flattened triangle indices
pub fn mesh_indices(mesh: &TriangleMesh) -> Vec<u32> {
    mesh.faces.iter().flat_map(|f| f.iter().map(|&i| i as u32)).collect()
}

/// Index ranges per draw group, paired with their material slot
pub fn group_ranges(mesh: &TriangleMesh) -> Vec<(Range<u32>, usize)> {
    mesh.draw_groups()
        .into_iter()
        .filter(|g| g.count > 0)
        .map(|g| ((g.start * 3) as u32..((g.start + g.count) * 3) as u32, g.material_index))
        .collect()
}

/// A mesh uploaded to the GPU, cached by the renderer under its [`MeshId`](kitcrate_core::MeshId)
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub groups: Vec<(Range<u32>, usize)>,
}

impl GpuMesh {
    pub fn upload(gpu: &GpuContext, mesh: &TriangleMesh) -> Self {
        Self {
            vertex_buffer: gpu.create_buffer_init("Scene Vertex Buffer", &mesh_vertices(mesh), wgpu::BufferUsages::VERTEX),
            index_buffer: gpu.create_buffer_init("Scene Index Buffer", &mesh_indices(mesh), wgpu::BufferUsages::INDEX),
            groups: group_ranges(mesh),
        }
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitcrate_core::Point3f;

    fn quad() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<SceneVertex>(), 32);
        assert_eq!(SceneVertex::desc().attributes.len(), 3);
        assert_eq!(SceneVertex::position_desc().attributes.len(), 1);
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let vertices = mesh_vertices(&quad());
        assert_eq!(vertices.len(), 4);
        for v in &vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.uv, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_groups_become_index_ranges() {
        let mut mesh = quad();
        assert_eq!(group_ranges(&mesh), vec![(0..6, 0)]);

        mesh.add_group(0, 1, 0);
        mesh.add_group(1, 1, 3);
        assert_eq!(group_ranges(&mesh), vec![(0..3, 0), (3..6, 3)]);
        assert_eq!(mesh_indices(&mesh), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_mesh_id_survives_sharing_not_reallocation() {
        use std::sync::Arc;

        let a = Arc::new(quad());
        let shared = a.clone();
        assert_eq!(a.id(), shared.id());

        let old = a.id();
        drop(a);
        drop(shared);
        // A replacement may land at the freed address; it still gets a new id
        let b = Arc::new(quad());
        assert_ne!(b.id(), old);
    }
}
