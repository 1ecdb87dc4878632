//! Construction of the preview models and panel texture assignment

use std::f32::consts::PI;
use std::sync::Arc;

use kitcrate_core::{Material, MaterialSlots, PanelTexture, Result, Rgb, Transform3D};
use tracing::debug;

use crate::model::{GarmentModel, MeshPart, ModelKind, PartKind, PreviewModel, WornModel};
use crate::primitives::{box_mesh, cylinder_mesh, sphere_mesh};

/// Torso box slot facing +z
pub const FRONT_SLOT: usize = 4;
/// Torso box slot facing -z
pub const BACK_SLOT: usize = 5;

pub const GARMENT_ROUGHNESS: f32 = 0.7;
pub const GARMENT_METALNESS: f32 = 0.1;

/// Shown on the garment until the first panel textures arrive
pub const PLACEHOLDER_COLOR: Rgb = Rgb::from_u32(0xff0000);
pub const SKIN_COLOR: Rgb = Rgb::from_u32(0xffdbac);
pub const DARK_COLOR: Rgb = Rgb::from_u32(0x1a1a1a);
pub const BODY_ROUGHNESS: f32 = 0.8;

/// Height of the garment above the mannequin origin when worn
pub const WORN_GARMENT_OFFSET: f32 = 0.3;

fn placeholder() -> MaterialSlots {
    MaterialSlots::Single(Material::standard(PLACEHOLDER_COLOR, GARMENT_ROUGHNESS, GARMENT_METALNESS))
}

fn body_material(color: Rgb) -> MaterialSlots {
    MaterialSlots::Single(Material::standard(color, BODY_ROUGHNESS, 0.0))
}

/// Torso, sleeves and collar around the origin, dressed in the placeholder material
pub fn build_garment_only() -> Result<GarmentModel> {
    let torso = Arc::new(box_mesh(2.0, 2.5, 0.3)?);
    let sleeve = Arc::new(cylinder_mesh(0.25, 0.22, 1.2, 16)?);
    let collar = Arc::new(cylinder_mesh(0.5, 0.55, 0.2, 32)?);

    let garment = GarmentModel {
        transform: Transform3D::identity(),
        torso: MeshPart::new(PartKind::Torso, torso, Transform3D::identity(), placeholder()),
        left_sleeve: MeshPart::new(
            PartKind::LeftSleeve,
            sleeve.clone(),
            Transform3D::translation(-1.2, -0.3, 0.0).with_rotation_z(PI / 2.5),
            placeholder(),
        ),
        right_sleeve: MeshPart::new(
            PartKind::RightSleeve,
            sleeve,
            Transform3D::translation(1.2, -0.3, 0.0).with_rotation_z(-PI / 2.5),
            placeholder(),
        ),
        collar: MeshPart::new(
            PartKind::Collar,
            collar,
            Transform3D::translation(0.0, 1.35, 0.0),
            placeholder(),
        ),
    };

    debug!("Built garment model");
    Ok(garment)
}

/// The garment raised onto a mannequin with head, neck, waist, legs and arms
pub fn build_worn_model() -> Result<WornModel> {
    let mut garment = build_garment_only()?;
    garment.transform = Transform3D::translation(0.0, WORN_GARMENT_OFFSET, 0.0);

    let head = Arc::new(sphere_mesh(0.4, 32, 32)?);
    let neck = Arc::new(cylinder_mesh(0.2, 0.25, 0.3, 16)?);
    let waist = Arc::new(cylinder_mesh(0.9, 0.85, 0.6, 32)?);
    let leg = Arc::new(cylinder_mesh(0.25, 0.22, 1.8, 16)?);
    let arm = Arc::new(cylinder_mesh(0.15, 0.14, 1.5, 16)?);

    let worn = WornModel {
        transform: Transform3D::identity(),
        head: MeshPart::new(
            PartKind::Head,
            head,
            Transform3D::translation(0.0, 2.2, 0.0),
            body_material(SKIN_COLOR),
        ),
        neck: MeshPart::new(
            PartKind::Neck,
            neck,
            Transform3D::translation(0.0, 1.85, 0.0),
            body_material(SKIN_COLOR),
        ),
        garment,
        waist: MeshPart::new(
            PartKind::Waist,
            waist,
            Transform3D::translation(0.0, -1.3, 0.0),
            body_material(DARK_COLOR),
        ),
        left_leg: MeshPart::new(
            PartKind::LeftLeg,
            leg.clone(),
            Transform3D::translation(-0.35, -2.5, 0.0),
            body_material(DARK_COLOR),
        ),
        right_leg: MeshPart::new(
            PartKind::RightLeg,
            leg,
            Transform3D::translation(0.35, -2.5, 0.0),
            body_material(DARK_COLOR),
        ),
        left_arm: MeshPart::new(
            PartKind::LeftArm,
            arm.clone(),
            Transform3D::translation(-1.4, -0.5, 0.0).with_rotation_z(PI / 6.0),
            body_material(SKIN_COLOR),
        ),
        right_arm: MeshPart::new(
            PartKind::RightArm,
            arm,
            Transform3D::translation(1.4, -0.5, 0.0).with_rotation_z(-PI / 6.0),
            body_material(SKIN_COLOR),
        ),
    };

    debug!("Built worn model");
    Ok(worn)
}

pub fn build_model(kind: ModelKind) -> Result<PreviewModel> {
    Ok(match kind {
        ModelKind::GarmentOnly => PreviewModel::GarmentOnly(build_garment_only()?),
        ModelKind::Worn => PreviewModel::Worn(build_worn_model()?),
    })
}

/// Dress the garment in freshly synthesized panels
///
/// The torso's front and back faces show the front and back panels; its
/// remaining faces, the sleeves and the collar all show the sleeve panel.
/// Previous assignments are replaced wholesale.
pub fn assign_panel_textures(
    garment: &mut GarmentModel,
    front: Arc<PanelTexture>,
    back: Arc<PanelTexture>,
    sleeve: Arc<PanelTexture>,
) {
    let textured = |texture: &Arc<PanelTexture>| Material::textured(texture.clone(), GARMENT_ROUGHNESS, GARMENT_METALNESS);

    let torso_faces = std::array::from_fn(|slot| match slot {
        FRONT_SLOT => textured(&front),
        BACK_SLOT => textured(&back),
        _ => textured(&sleeve),
    });
    garment.torso.materials = MaterialSlots::BoxFaces(torso_faces);

    for part in [&mut garment.left_sleeve, &mut garment.right_sleeve, &mut garment.collar] {
        part.materials = MaterialSlots::Single(textured(&sleeve));
    }

    debug!(
        "Assigned panels front={} back={} sleeve={}",
        front.id().value(),
        back.id().value(),
        sleeve.id().value()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::RgbaImage;
    use kitcrate_core::{Point3f, TextureId};

    fn panel() -> Arc<PanelTexture> {
        Arc::new(PanelTexture::new(RgbaImage::new(2, 2)))
    }

    fn texture_id(material: &Material) -> Option<TextureId> {
        material.texture.as_ref().map(|t| t.id())
    }

    #[test]
    fn test_garment_layout() {
        let garment = build_garment_only().unwrap();
        assert_eq!(garment.torso.mesh.material_slot_count(), 6);
        assert!(Arc::ptr_eq(&garment.left_sleeve.mesh, &garment.right_sleeve.mesh));
        assert_relative_eq!(garment.collar.transform.position.y, 1.35);
        assert_relative_eq!(garment.left_sleeve.transform.rotation.z, PI / 2.5);
        assert_relative_eq!(garment.right_sleeve.transform.rotation.z, -PI / 2.5);
        for part in garment.parts() {
            assert!(part.kind.is_garment());
            assert_eq!(part.materials.slot(0).color, PLACEHOLDER_COLOR);
        }
    }

    #[test]
    fn test_worn_layout() {
        let worn = build_worn_model().unwrap();
        assert_relative_eq!(worn.garment.transform.position.y, WORN_GARMENT_OFFSET);
        assert_relative_eq!(worn.head.transform.position.y, 2.2);
        assert_relative_eq!(worn.left_arm.transform.rotation.z, PI / 6.0);
        assert_relative_eq!(worn.left_leg.transform.position.x, -0.35);
        assert_eq!(worn.waist.materials.slot(0).color, DARK_COLOR);
        assert_eq!(worn.head.materials.slot(0).color, SKIN_COLOR);
        assert!(worn.body_parts().iter().all(|p| !p.kind.is_garment()));
    }

    #[test]
    fn test_assign_panels() {
        let mut model = build_model(ModelKind::Worn).unwrap();
        let (front, back, sleeve) = (panel(), panel(), panel());
        assign_panel_textures(model.garment_mut(), front.clone(), back.clone(), sleeve.clone());

        let garment = model.garment();
        let torso = &garment.torso.materials;
        assert_eq!(torso.len(), 6);
        assert_eq!(texture_id(torso.slot(FRONT_SLOT)), Some(front.id()));
        assert_eq!(texture_id(torso.slot(BACK_SLOT)), Some(back.id()));
        for slot in 0..4 {
            assert_eq!(texture_id(torso.slot(slot)), Some(sleeve.id()));
        }
        for part in [&garment.left_sleeve, &garment.right_sleeve, &garment.collar] {
            assert_eq!(part.materials.len(), 1);
            assert_eq!(texture_id(part.materials.slot(0)), Some(sleeve.id()));
            assert_eq!(part.materials.slot(0).color, Rgb::WHITE);
            assert_relative_eq!(part.materials.slot(0).roughness, GARMENT_ROUGHNESS);
        }

        if let PreviewModel::Worn(worn) = &model {
            for part in worn.body_parts() {
                assert!(part.materials.slot(0).texture.is_none());
            }
        } else {
            panic!("expected worn model");
        }
    }

    #[test]
    fn test_reassignment_replaces_slots() {
        let mut garment = build_garment_only().unwrap();
        assign_panel_textures(&mut garment, panel(), panel(), panel());
        let next_front = panel();
        assign_panel_textures(&mut garment, next_front.clone(), panel(), panel());
        assert_eq!(texture_id(garment.torso.materials.slot(FRONT_SLOT)), Some(next_front.id()));
    }

    #[test]
    fn test_world_matrices_follow_hierarchy() {
        let mut model = build_model(ModelKind::Worn).unwrap();
        let collar_world = |model: &PreviewModel| {
            let part = model
                .parts()
                .into_iter()
                .find(|p| p.part.kind == PartKind::Collar)
                .unwrap();
            part.world.transform_point(&Point3f::origin())
        };

        // Collar sits at 1.35 within the garment, raised 0.3 when worn
        assert_relative_eq!(collar_world(&model), Point3f::new(0.0, 1.65, 0.0), epsilon = 1e-5);
        assert_eq!(model.parts().len(), 11);

        model.set_rotation(0.0, PI);
        assert_relative_eq!(collar_world(&model), Point3f::new(0.0, 1.65, 0.0), epsilon = 1e-5);
        model.set_rotation(PI / 2.0, 0.0);
        assert_relative_eq!(collar_world(&model), Point3f::new(0.0, 0.0, 1.65), epsilon = 1e-5);

        let garment_only = build_model(ModelKind::GarmentOnly).unwrap();
        assert_eq!(garment_only.parts().len(), 4);
    }
}
