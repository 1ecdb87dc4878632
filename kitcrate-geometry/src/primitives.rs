//! Parametric box, cylinder and sphere meshes
//!
//! Vertex layout and face grouping follow the usual three.js conventions so
//! panel textures land on the same faces. Texture coordinates are in image
//! orientation: `v = 0` is the top row of the texture.

use std::f32::consts::PI;

use kitcrate_core::{Error, Point3f, Result, TriangleMesh, Vector3f};

/// Box face order: +x, -x, +y, -y, +z, -z.
///
/// Each entry is (outward normal, direction of increasing u, direction of
/// increasing v) seen from outside the box.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
];

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidData(format!("{} must be positive, got {}", name, value)))
    }
}

fn check_segments(name: &str, value: usize, min: usize) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(Error::InvalidData(format!("{} must be at least {}, got {}", name, min, value)))
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Point3f>,
    normals: Vec<Vector3f>,
    uvs: Vec<[f32; 2]>,
    faces: Vec<[usize; 3]>,
}

impl MeshBuilder {
    fn push_vertex(&mut self, position: Point3f, normal: Vector3f, uv: [f32; 2]) -> usize {
        self.vertices.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.vertices.len() - 1
    }

    fn finish(self) -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(self.vertices, self.faces);
        mesh.set_normals(self.normals);
        mesh.set_uvs(self.uvs);
        mesh
    }
}

/// Axis-aligned box centered on the origin with one face group per side
///
/// Faces are grouped in the order +x, -x, +y, -y, +z, -z, group `i` using
/// material slot `i`. Each face carries the full texture.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> Result<TriangleMesh> {
    check_positive("width", width)?;
    check_positive("height", height)?;
    check_positive("depth", depth)?;

    let half = Vector3f::new(width / 2.0, height / 2.0, depth / 2.0);
    let mut builder = MeshBuilder::default();
    let mut groups = Vec::with_capacity(BOX_FACES.len());

    for (slot, (normal, u_axis, v_axis)) in BOX_FACES.iter().enumerate() {
        let normal = Vector3f::from(*normal);
        let u_axis = Vector3f::from(*u_axis).component_mul(&half);
        let v_axis = Vector3f::from(*v_axis).component_mul(&half);
        let center = normal.component_mul(&half);

        let corner = |u: f32, v: f32| Point3f::from(center + u_axis * (2.0 * u - 1.0) + v_axis * (2.0 * v - 1.0));

        let a = builder.push_vertex(corner(0.0, 0.0), normal, [0.0, 0.0]);
        let b = builder.push_vertex(corner(1.0, 0.0), normal, [1.0, 0.0]);
        let c = builder.push_vertex(corner(1.0, 1.0), normal, [1.0, 1.0]);
        let d = builder.push_vertex(corner(0.0, 1.0), normal, [0.0, 1.0]);

        let start = builder.faces.len();
        builder.faces.push([a, d, c]);
        builder.faces.push([a, c, b]);
        groups.push((start, 2, slot));
    }

    let mut mesh = builder.finish();
    for (start, count, slot) in groups {
        mesh.add_group(start, count, slot);
    }
    Ok(mesh)
}

/// Capped cylinder (or truncated cone) along Y, centered on the origin
pub fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: usize) -> Result<TriangleMesh> {
    check_positive("radius_top", radius_top)?;
    check_positive("radius_bottom", radius_bottom)?;
    check_positive("height", height)?;
    check_segments("radial_segments", radial_segments, 3)?;

    let mut builder = MeshBuilder::default();
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    // Side: two rings with a duplicated seam column
    let mut rings = [Vec::new(), Vec::new()];
    for (row, ring) in rings.iter_mut().enumerate() {
        let v = row as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for column in 0..=radial_segments {
            let u = column as f32 / radial_segments as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            let position = Point3f::new(radius * sin, half_height - v * height, radius * cos);
            let normal = Vector3f::new(sin, slope, cos).normalize();
            ring.push(builder.push_vertex(position, normal, [u, v]));
        }
    }
    for column in 0..radial_segments {
        let a = rings[0][column];
        let b = rings[1][column];
        let c = rings[1][column + 1];
        let d = rings[0][column + 1];
        builder.faces.push([a, b, d]);
        builder.faces.push([b, c, d]);
    }

    // Caps: fan around a center vertex per segment
    for (top, radius, y) in [(true, radius_top, half_height), (false, radius_bottom, -half_height)] {
        let sign = if top { 1.0 } else { -1.0 };
        let normal = Vector3f::new(0.0, sign, 0.0);

        let centers: Vec<usize> = (0..radial_segments)
            .map(|_| builder.push_vertex(Point3f::new(0.0, y, 0.0), normal, [0.5, 0.5]))
            .collect();
        let ring: Vec<usize> = (0..=radial_segments)
            .map(|column| {
                let theta = column as f32 / radial_segments as f32 * 2.0 * PI;
                let (sin, cos) = theta.sin_cos();
                let uv = [sin * 0.5 + 0.5, 0.5 - cos * 0.5 * sign];
                builder.push_vertex(Point3f::new(radius * sin, y, radius * cos), normal, uv)
            })
            .collect();

        for column in 0..radial_segments {
            let center = centers[column];
            if top {
                builder.faces.push([center, ring[column], ring[column + 1]]);
            } else {
                builder.faces.push([center, ring[column + 1], ring[column]]);
            }
        }
    }

    Ok(builder.finish())
}

/// UV sphere centered on the origin
pub fn sphere_mesh(radius: f32, width_segments: usize, height_segments: usize) -> Result<TriangleMesh> {
    check_positive("radius", radius)?;
    check_segments("width_segments", width_segments, 3)?;
    check_segments("height_segments", height_segments, 2)?;

    let mut builder = MeshBuilder::default();
    let mut grid = Vec::with_capacity(height_segments + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let row: Vec<usize> = (0..=width_segments)
            .map(|ix| {
                let u = ix as f32 / width_segments as f32;
                let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
                let (sin_theta, cos_theta) = (v * PI).sin_cos();
                let normal = Vector3f::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
                builder.push_vertex(Point3f::from(normal * radius), normal, [u, v])
            })
            .collect();
        grid.push(row);
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            // Pole rows collapse to triangles
            if iy != 0 {
                builder.faces.push([a, b, d]);
            }
            if iy != height_segments - 1 {
                builder.faces.push([b, c, d]);
            }
        }
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Every face's winding must agree with its vertex normals
    fn assert_outward(mesh: &TriangleMesh) {
        let normals = mesh.normals.as_ref().unwrap();
        for (face, face_normal) in mesh.faces.iter().zip(mesh.calculate_face_normals()) {
            let vertex_normal = normals[face[0]] + normals[face[1]] + normals[face[2]];
            assert!(face_normal.dot(&vertex_normal) > 0.0, "face {:?} winds inward", face);
        }
    }

    #[test]
    fn test_box_layout() {
        let mesh = box_mesh(2.0, 2.5, 0.3).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.groups.len(), 6);
        assert_eq!(mesh.material_slot_count(), 6);
        for (i, group) in mesh.groups.iter().enumerate() {
            assert_eq!(group.start, i * 2);
            assert_eq!(group.count, 2);
            assert_eq!(group.material_index, i);
        }

        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min, Point3f::new(-1.0, -1.25, -0.15));
        assert_relative_eq!(max, Point3f::new(1.0, 1.25, 0.15));
        assert_outward(&mesh);
    }

    #[test]
    fn test_box_front_face_reads_upright() {
        let mesh = box_mesh(2.0, 2.0, 2.0).unwrap();
        let uvs = mesh.uvs.as_ref().unwrap();
        // Group 4 is +z; its first vertex is the top-left corner seen from the front
        let first = mesh.faces[mesh.groups[4].start][0];
        assert_relative_eq!(mesh.vertices[first], Point3f::new(-1.0, 1.0, 1.0));
        assert_eq!(uvs[first], [0.0, 0.0]);

        // The back face mirrors x so text reads left to right from behind
        let first = mesh.faces[mesh.groups[5].start][0];
        assert_relative_eq!(mesh.vertices[first], Point3f::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_cylinder_counts_and_extent() {
        let mesh = cylinder_mesh(0.25, 0.22, 1.2, 16).unwrap();
        // Side 2 x 17, caps 2 x (16 + 17)
        assert_eq!(mesh.vertex_count(), 34 + 66);
        assert_eq!(mesh.face_count(), 32 + 32);

        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.y, -0.6, epsilon = 1e-5);
        assert_relative_eq!(max.y, 0.6, epsilon = 1e-5);
        assert!(max.x <= 0.25 + 1e-5);
        assert_outward(&mesh);
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = sphere_mesh(0.4, 32, 32).unwrap();
        assert_eq!(mesh.vertex_count(), 33 * 33);
        assert_eq!(mesh.face_count(), 32 * 32 * 2 - 64);
        for v in &mesh.vertices {
            assert_relative_eq!(v.coords.norm(), 0.4, epsilon = 1e-5);
        }
        assert_outward(&mesh);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(box_mesh(0.0, 1.0, 1.0).is_err());
        assert!(cylinder_mesh(1.0, 1.0, 1.0, 2).is_err());
        assert!(sphere_mesh(-1.0, 8, 8).is_err());
        assert!(sphere_mesh(1.0, 8, 1).is_err());
    }
}
