//! One preview: a model, its panel textures and the scene drawing them

use std::sync::Arc;

use image::RgbaImage;
use kitcrate_core::{Error, GarmentConfig, Result};
use kitcrate_geometry::{assign_panel_textures, build_model, ModelKind, PreviewModel};
use kitcrate_texture::TextureSynthesizer;
use tracing::debug;

use crate::backend::RenderBackend;
use crate::controller::{AnimationHandle, ObjectId, SceneController};
use crate::orbit::InputEvent;

/// A mounted garment preview driven by the host's frame loop
pub struct PreviewView<B: RenderBackend> {
    kind: ModelKind,
    controller: SceneController<B>,
    object: ObjectId,
    animation: AnimationHandle,
    synthesizer: TextureSynthesizer,
}

impl<B: RenderBackend> PreviewView<B> {
    /// Build the `kind` model, dress it for `config` and start animating it
    pub fn mount(
        backend: B,
        width: u32,
        height: u32,
        kind: ModelKind,
        config: &GarmentConfig,
        logo: Option<&RgbaImage>,
    ) -> Result<Self> {
        let mut controller = SceneController::mount(backend, width, height);
        let object = controller.add_object(build_model(kind)?);

        let animation = controller.animate(move |rotation, scene| {
            if let Some(model) = scene.get_mut(object) {
                model.set_rotation(rotation.x, rotation.y);
            }
        });

        let mut view = Self {
            kind,
            controller,
            object,
            animation,
            synthesizer: TextureSynthesizer::new(),
        };
        view.apply_config(config, logo)?;
        Ok(view)
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn controller(&self) -> &SceneController<B> {
        &self.controller
    }

    pub fn animation(&self) -> &AnimationHandle {
        &self.animation
    }

    pub fn model(&self) -> Option<&PreviewModel> {
        self.controller.object(self.object)
    }

    /// Re-synthesize all three panels and put them on the garment
    pub fn apply_config(&mut self, config: &GarmentConfig, logo: Option<&RgbaImage>) -> Result<()> {
        let panels = self.synthesizer.render_panels(config, logo);
        let model = self
            .controller
            .object_mut(self.object)
            .ok_or_else(|| Error::Visualization(format!("{} model is missing from its scene", self.kind)))?;

        assign_panel_textures(
            model.garment_mut(),
            Arc::new(panels.front),
            Arc::new(panels.back),
            Arc::new(panels.sleeve),
        );
        debug!("{} textures refreshed", self.kind);
        Ok(())
    }

    pub fn tick(&mut self) -> Result<bool> {
        self.controller.tick()
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.controller.handle_input(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.controller.resize(width, height);
    }

    pub fn dispose(self) {
        self.controller.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::RecordingBackend;
    use kitcrate_core::{PatternVariant, TextureId};
    use kitcrate_geometry::{BACK_SLOT, FRONT_SLOT};

    fn front_texture(view: &PreviewView<RecordingBackend>) -> TextureId {
        let slot = view.model().unwrap().garment().torso.materials.slot(FRONT_SLOT);
        slot.texture.as_ref().unwrap().id()
    }

    #[test]
    fn test_mount_dresses_garment() {
        let backend = RecordingBackend::default();
        let view = PreviewView::mount(backend.clone(), 800, 500, ModelKind::Worn, &GarmentConfig::default(), None).unwrap();

        let garment = view.model().unwrap().garment();
        let back = garment.torso.materials.slot(BACK_SLOT).texture.as_ref().unwrap();
        assert_eq!(back.width(), 2048);
        let sleeve = garment.collar.materials.slot(0).texture.as_ref().unwrap();
        assert_eq!(sleeve.width(), 512);
        assert!(view.animation().is_active());
    }

    #[test]
    fn test_config_change_visible_next_frame() {
        let backend = RecordingBackend::default();
        let mut view =
            PreviewView::mount(backend.clone(), 800, 500, ModelKind::GarmentOnly, &GarmentConfig::default(), None).unwrap();
        assert!(view.tick().unwrap());
        let before = front_texture(&view);

        let mut config = GarmentConfig::default();
        config.pattern = PatternVariant::Stripes;
        view.apply_config(&config, None).unwrap();
        let after = front_texture(&view);
        assert_ne!(before, after);

        assert!(view.tick().unwrap());
        let log = backend.log.borrow();
        assert!(log.frames[0].textures.contains(&before));
        assert!(log.frames[1].textures.contains(&after));
        assert!(!log.frames[1].textures.contains(&before));
        assert_eq!(log.frames[1].textures.len(), 3);
    }

    #[test]
    fn test_dispose_stops_animation() {
        let backend = RecordingBackend::default();
        let view = PreviewView::mount(backend.clone(), 800, 500, ModelKind::GarmentOnly, &GarmentConfig::default(), None).unwrap();
        let handle = view.animation().clone();
        view.dispose();

        assert!(!handle.is_active());
        assert_eq!(backend.log.borrow().disposals, 1);
    }
}
