//! Surface materials and per-mesh material slot assignment

use std::sync::Arc;

use crate::{PanelTexture, Rgb};

/// Number of faces on a box mesh, one material slot each
pub const BOX_FACE_SLOTS: usize = 6;

/// A lit surface with an optional color map
#[derive(Debug, Clone)]
pub struct Material {
    /// Multiplied with the texture; white shows the texture unmodified
    pub color: Rgb,
    pub texture: Option<Arc<PanelTexture>>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Material {
    /// Untextured material
    pub fn standard(color: Rgb, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            texture: None,
            roughness,
            metalness,
        }
    }

    /// White material showing `texture`
    pub fn textured(texture: Arc<PanelTexture>, roughness: f32, metalness: f32) -> Self {
        Self {
            color: Rgb::WHITE,
            texture: Some(texture),
            roughness,
            metalness,
        }
    }
}

/// Material assignment for one mesh
#[derive(Debug, Clone)]
pub enum MaterialSlots {
    /// One material for every face group
    Single(Material),
    /// One material per box face, indexed like the box's face groups
    BoxFaces([Material; BOX_FACE_SLOTS]),
}

impl MaterialSlots {
    /// Material drawn for face group `material_index`
    ///
    /// A single material serves every slot; box slots beyond the sixth fall
    /// back to the last face.
    pub fn slot(&self, material_index: usize) -> &Material {
        match self {
            MaterialSlots::Single(material) => material,
            MaterialSlots::BoxFaces(faces) => &faces[material_index.min(BOX_FACE_SLOTS - 1)],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MaterialSlots::Single(_) => 1,
            MaterialSlots::BoxFaces(_) => BOX_FACE_SLOTS,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        let slice: &[Material] = match self {
            MaterialSlots::Single(material) => std::slice::from_ref(material),
            MaterialSlots::BoxFaces(faces) => faces,
        };
        slice.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_serves_every_slot() {
        let slots = MaterialSlots::Single(Material::standard(Rgb::from_u32(0xff0000), 0.7, 0.1));
        assert_eq!(slots.slot(0).color, slots.slot(5).color);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_box_faces_indexed() {
        let faces = std::array::from_fn(|i| Material::standard(Rgb::new(i as u8, 0, 0), 0.5, 0.0));
        let slots = MaterialSlots::BoxFaces(faces);
        assert_eq!(slots.slot(4).color.r, 4);
        assert_eq!(slots.slot(9).color.r, 5);
        assert_eq!(slots.iter().count(), 6);
    }
}
