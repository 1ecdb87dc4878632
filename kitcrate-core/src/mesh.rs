//! Mesh data structures and functionality

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one mesh value
///
/// GPU buffers are cached under this id. Cloning a mesh issues a new id, so
/// an edited copy never reuses buffers uploaded for the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    /// Issue a new id; ids are never reused
    pub fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A contiguous run of faces drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceGroup {
    /// Index of the first face in the group
    pub start: usize,
    /// Number of faces in the group
    pub count: usize,
    /// Material slot used for this group
    pub material_index: usize,
}

/// A triangle mesh with vertices, faces and optional per-vertex attributes
#[derive(Debug, Serialize, Deserialize)]
pub struct TriangleMesh {
    #[serde(skip, default = "MeshId::next")]
    id: MeshId,
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub groups: Vec<FaceGroup>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            id: MeshId::next(),
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            uvs: None,
            groups: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new()
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Number of material slots the groups refer to (at least one)
    pub fn material_slot_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.material_index + 1)
            .max()
            .unwrap_or(1)
    }

    /// Record that `count` faces starting at `start` use `material_index`
    pub fn add_group(&mut self, start: usize, count: usize, material_index: usize) {
        self.groups.push(FaceGroup {
            start,
            count,
            material_index,
        });
    }

    /// Groups covering the mesh; a single slot-0 group when none were recorded
    pub fn draw_groups(&self) -> Vec<FaceGroup> {
        if self.groups.is_empty() {
            vec![FaceGroup {
                start: 0,
                count: self.faces.len(),
                material_index: 0,
            }]
        } else {
            self.groups.clone()
        }
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set texture coordinates
    pub fn set_uvs(&mut self, uvs: Vec<[f32; 2]>) {
        if uvs.len() == self.vertices.len() {
            self.uvs = Some(uvs);
        }
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.vertices.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }
}

impl Clone for TriangleMesh {
    fn clone(&self) -> Self {
        Self {
            id: MeshId::next(),
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            groups: self.groups.clone(),
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
