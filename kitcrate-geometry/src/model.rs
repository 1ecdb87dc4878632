//! Tagged garment and mannequin models

use std::fmt;
use std::sync::Arc;

use kitcrate_core::{MaterialSlots, Matrix4, Transform3D, TriangleMesh};

/// Which body or garment piece a mesh part represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Torso,
    LeftSleeve,
    RightSleeve,
    Collar,
    Head,
    Neck,
    Waist,
    LeftLeg,
    RightLeg,
    LeftArm,
    RightArm,
}

impl PartKind {
    /// Whether the part belongs to the garment rather than the mannequin
    pub fn is_garment(self) -> bool {
        matches!(
            self,
            PartKind::Torso | PartKind::LeftSleeve | PartKind::RightSleeve | PartKind::Collar
        )
    }
}

/// One drawable mesh with its local transform and material assignment
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub kind: PartKind,
    pub mesh: Arc<TriangleMesh>,
    pub transform: Transform3D,
    pub materials: MaterialSlots,
}

impl MeshPart {
    pub fn new(kind: PartKind, mesh: Arc<TriangleMesh>, transform: Transform3D, materials: MaterialSlots) -> Self {
        Self {
            kind,
            mesh,
            transform,
            materials,
        }
    }
}

/// The garment on its own: torso, both sleeves and the collar
#[derive(Debug, Clone)]
pub struct GarmentModel {
    pub transform: Transform3D,
    pub torso: MeshPart,
    pub left_sleeve: MeshPart,
    pub right_sleeve: MeshPart,
    pub collar: MeshPart,
}

impl GarmentModel {
    pub fn parts(&self) -> [&MeshPart; 4] {
        [&self.torso, &self.left_sleeve, &self.right_sleeve, &self.collar]
    }

    pub fn parts_mut(&mut self) -> [&mut MeshPart; 4] {
        [
            &mut self.torso,
            &mut self.left_sleeve,
            &mut self.right_sleeve,
            &mut self.collar,
        ]
    }
}

/// The garment worn by a simple mannequin
#[derive(Debug, Clone)]
pub struct WornModel {
    pub transform: Transform3D,
    pub head: MeshPart,
    pub neck: MeshPart,
    pub garment: GarmentModel,
    pub waist: MeshPart,
    pub left_leg: MeshPart,
    pub right_leg: MeshPart,
    pub left_arm: MeshPart,
    pub right_arm: MeshPart,
}

impl WornModel {
    /// Mannequin parts, excluding the garment
    pub fn body_parts(&self) -> [&MeshPart; 7] {
        [
            &self.head,
            &self.neck,
            &self.waist,
            &self.left_leg,
            &self.right_leg,
            &self.left_arm,
            &self.right_arm,
        ]
    }
}

/// Which preview model to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    GarmentOnly,
    Worn,
}

impl ModelKind {
    pub fn title(self) -> &'static str {
        match self {
            ModelKind::GarmentOnly => "Garment Only View",
            ModelKind::Worn => "Wearing Garment View",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A mesh part resolved to world space
#[derive(Debug, Clone, Copy)]
pub struct WorldPart<'a> {
    pub part: &'a MeshPart,
    pub world: Matrix4<f32>,
}

/// Root object of a preview scene
#[derive(Debug, Clone)]
pub enum PreviewModel {
    GarmentOnly(GarmentModel),
    Worn(WornModel),
}

impl PreviewModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            PreviewModel::GarmentOnly(_) => ModelKind::GarmentOnly,
            PreviewModel::Worn(_) => ModelKind::Worn,
        }
    }

    pub fn garment(&self) -> &GarmentModel {
        match self {
            PreviewModel::GarmentOnly(garment) => garment,
            PreviewModel::Worn(worn) => &worn.garment,
        }
    }

    pub fn garment_mut(&mut self) -> &mut GarmentModel {
        match self {
            PreviewModel::GarmentOnly(garment) => garment,
            PreviewModel::Worn(worn) => &mut worn.garment,
        }
    }

    pub fn root_transform(&self) -> &Transform3D {
        match self {
            PreviewModel::GarmentOnly(garment) => &garment.transform,
            PreviewModel::Worn(worn) => &worn.transform,
        }
    }

    /// Set the root rotation: `x` is pitch and `y` is yaw, in radians
    pub fn set_rotation(&mut self, x: f32, y: f32) {
        match self {
            PreviewModel::GarmentOnly(garment) => garment.transform.set_rotation_xy(x, y),
            PreviewModel::Worn(worn) => worn.transform.set_rotation_xy(x, y),
        }
    }

    /// Every mesh part with its world matrix
    pub fn parts(&self) -> Vec<WorldPart<'_>> {
        match self {
            PreviewModel::GarmentOnly(garment) => garment_world_parts(garment, Matrix4::identity()),
            PreviewModel::Worn(worn) => {
                let root = worn.transform.matrix();
                let mut parts: Vec<WorldPart<'_>> = worn
                    .body_parts()
                    .into_iter()
                    .map(|part| WorldPart {
                        part,
                        world: root * part.transform.matrix(),
                    })
                    .collect();
                parts.extend(garment_world_parts(&worn.garment, root));
                parts
            }
        }
    }
}

fn garment_world_parts(garment: &GarmentModel, parent: Matrix4<f32>) -> Vec<WorldPart<'_>> {
    let base = parent * garment.transform.matrix();
    garment
        .parts()
        .into_iter()
        .map(|part| WorldPart {
            part,
            world: base * part.transform.matrix(),
        })
        .collect()
}
