//! Scene state, the per-frame callback and the mount/dispose lifecycle

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use kitcrate_core::{LightRig, Result, Rgb};
use kitcrate_geometry::{PreviewModel, WorldPart};
use kitcrate_gpu::{DrawItem, SceneFrame};
use tracing::{debug, info};

use crate::backend::RenderBackend;
use crate::camera::Camera;
use crate::orbit::{InputEvent, OrbitController, OrbitRotation};

pub const BACKGROUND_COLOR: Rgb = Rgb::from_u32(0xf8f9fa);

/// Handle to an object added to a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

/// Root objects plus the environment they are lit in
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Rgb,
    pub lights: LightRig,
    objects: Vec<(ObjectId, PreviewModel)>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            background: BACKGROUND_COLOR,
            lights: LightRig::default(),
            objects: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, model: PreviewModel) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, model));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PreviewModel> {
        let index = self.objects.iter().position(|(object, _)| *object == id)?;
        Some(self.objects.remove(index).1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PreviewModel> {
        self.objects.iter().find(|(object, _)| *object == id).map(|(_, model)| model)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PreviewModel> {
        self.objects
            .iter_mut()
            .find(|(object, _)| *object == id)
            .map(|(_, model)| model)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Everything the renderer needs to draw the scene from `camera`
    pub fn frame<'a>(&'a self, camera: &Camera) -> SceneFrame<'a> {
        let items = self
            .objects
            .iter()
            .flat_map(|(_, model)| model.parts())
            .map(|WorldPart { part, world }| DrawItem {
                mesh: &part.mesh,
                world,
                materials: &part.materials,
            })
            .collect();

        SceneFrame {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            camera_position: camera.position,
            background: self.background,
            lights: self.lights,
            items,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation flag for a running animation
///
/// Clones share the flag. Cancelling any clone stops the loop that
/// [`SceneController::tick`] drives.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    active: Rc<Cell<bool>>,
}

impl AnimationHandle {
    fn new() -> Self {
        Self {
            active: Rc::new(Cell::new(true)),
        }
    }

    pub fn cancel(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Mounted,
    Disposed,
}

type FrameCallback = Box<dyn FnMut(OrbitRotation, &mut Scene)>;

/// Owns one scene, its camera and orbit input, and the backend drawing it
pub struct SceneController<B: RenderBackend> {
    backend: B,
    camera: Camera,
    orbit: OrbitController,
    scene: Scene,
    callback: Option<FrameCallback>,
    animation: Option<AnimationHandle>,
    state: RenderState,
}

impl<B: RenderBackend> SceneController<B> {
    /// Start a fresh scene drawn through `backend` at the given size
    pub fn mount(backend: B, width: u32, height: u32) -> Self {
        let mut camera = Camera::default();
        camera.set_aspect(width, height);
        info!("Scene mounted at {}x{}", width, height);

        Self {
            backend,
            camera,
            orbit: OrbitController::new(),
            scene: Scene::new(),
            callback: None,
            animation: None,
            state: RenderState::Mounted,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == RenderState::Disposed
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn add_object(&mut self, model: PreviewModel) -> ObjectId {
        debug!("Adding {} to scene", model.kind());
        self.scene.add(model)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<PreviewModel> {
        self.scene.remove(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&PreviewModel> {
        self.scene.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut PreviewModel> {
        self.scene.get_mut(id)
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if self.is_disposed() {
            return;
        }
        self.orbit.handle(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.is_disposed() {
            debug!("Ignoring resize to {}x{} after dispose", width, height);
            return;
        }
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width, height);
        self.backend.resize(width, height);
    }

    /// Install the per-frame callback, cancelling any earlier animation
    pub fn animate<F>(&mut self, callback: F) -> AnimationHandle
    where
        F: FnMut(OrbitRotation, &mut Scene) + 'static,
    {
        if let Some(previous) = self.animation.take() {
            previous.cancel();
        }
        let handle = AnimationHandle::new();
        self.callback = Some(Box::new(callback));
        self.animation = Some(handle.clone());
        handle
    }

    /// Run one frame; `Ok(true)` asks the host for another
    pub fn tick(&mut self) -> Result<bool> {
        if self.is_disposed() {
            return Ok(false);
        }
        match &self.animation {
            Some(handle) if handle.is_active() => {}
            _ => return Ok(false),
        }

        let rotation = self.orbit.step();
        if let Some(callback) = self.callback.as_mut() {
            callback(rotation, &mut self.scene);
        }

        let frame = self.scene.frame(&self.camera);
        self.backend.render(&frame)?;
        Ok(true)
    }

    /// Stop the animation and release the backend
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.is_disposed() {
            return;
        }
        if let Some(handle) = self.animation.take() {
            handle.cancel();
        }
        self.callback = None;
        self.backend.dispose();
        self.state = RenderState::Disposed;
        info!("Scene disposed");
    }
}

impl<B: RenderBackend> Drop for SceneController<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: RenderBackend> fmt::Debug for SceneController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneController")
            .field("state", &self.state)
            .field("objects", &self.scene.len())
            .field("animating", &self.animation.as_ref().map(AnimationHandle::is_active))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::RecordingBackend;
    use approx::assert_relative_eq;
    use kitcrate_geometry::{build_model, ModelKind};

    fn mounted() -> (SceneController<RecordingBackend>, RecordingBackend) {
        let backend = RecordingBackend::default();
        (SceneController::mount(backend.clone(), 800, 500), backend)
    }

    #[test]
    fn test_mount_starts_fresh() {
        let (controller, backend) = mounted();
        assert_eq!(controller.state(), RenderState::Mounted);
        assert!(controller.scene().is_empty());
        assert_eq!(controller.scene().background, BACKGROUND_COLOR);
        assert_relative_eq!(controller.camera().aspect_ratio, 1.6);
        assert!(backend.log.borrow().frames.is_empty());
    }

    #[test]
    fn test_scene_objects() {
        let (mut controller, _) = mounted();
        let garment = controller.add_object(build_model(ModelKind::GarmentOnly).unwrap());
        let worn = controller.add_object(build_model(ModelKind::Worn).unwrap());
        assert_ne!(garment, worn);
        assert_eq!(controller.object(worn).unwrap().kind(), ModelKind::Worn);

        controller.object_mut(garment).unwrap().set_rotation(0.1, 0.2);
        assert_relative_eq!(controller.object(garment).unwrap().root_transform().rotation.y, 0.2);

        assert!(controller.remove_object(garment).is_some());
        assert!(controller.object(garment).is_none());
        assert!(controller.remove_object(garment).is_none());
        assert_eq!(controller.scene().len(), 1);
    }

    #[test]
    fn test_tick_requires_animation() {
        let (mut controller, backend) = mounted();
        assert!(!controller.tick().unwrap());
        assert!(backend.log.borrow().frames.is_empty());
    }

    #[test]
    fn test_tick_steps_calls_back_and_renders() {
        let (mut controller, backend) = mounted();
        let id = controller.add_object(build_model(ModelKind::GarmentOnly).unwrap());

        controller.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        controller.handle_input(InputEvent::PointerMove { x: 100.0, y: 0.0 });

        let seen = Rc::new(Cell::new(OrbitRotation::default()));
        let sink = seen.clone();
        let _handle = controller.animate(move |rotation, scene| {
            sink.set(rotation);
            if let Some(model) = scene.get_mut(id) {
                model.set_rotation(rotation.x, rotation.y);
            }
        });

        assert!(controller.tick().unwrap());
        assert!(controller.tick().unwrap());

        // Target yaw 0.5 after two smoothing steps
        let expected = 0.5 * (1.0 - 0.9f32.powi(2));
        assert_relative_eq!(seen.get().y, expected, epsilon = 1e-6);
        assert_relative_eq!(controller.object(id).unwrap().root_transform().rotation.y, expected, epsilon = 1e-6);

        let log = backend.log.borrow();
        assert_eq!(log.frames.len(), 2);
        assert_eq!(log.frames[0].items, 4);
        assert_eq!(log.frames[0].background, BACKGROUND_COLOR);
    }

    #[test]
    fn test_cancel_stops_loop() {
        let (mut controller, backend) = mounted();
        let handle = controller.animate(|_, _| {});
        assert!(controller.tick().unwrap());

        handle.cancel();
        assert!(!handle.is_active());
        assert!(!controller.tick().unwrap());
        assert_eq!(backend.log.borrow().frames.len(), 1);
    }

    #[test]
    fn test_animate_replaces_previous_handle() {
        let (mut controller, _) = mounted();
        let first = controller.animate(|_, _| {});
        let second = controller.animate(|_, _| {});
        assert!(!first.is_active());
        assert!(second.is_active());
        assert!(controller.tick().unwrap());
    }

    #[test]
    fn test_resize_reaches_backend() {
        let (mut controller, backend) = mounted();
        controller.resize(1000, 500);
        controller.resize(0, 500);
        assert_eq!(backend.log.borrow().resizes, vec![(1000, 500)]);
        assert_relative_eq!(controller.camera().aspect_ratio, 2.0);
    }

    #[test]
    fn test_dispose_once() {
        let (mut controller, backend) = mounted();
        let handle = controller.animate(|_, _| {});
        controller.dispose();

        assert!(!handle.is_active());
        assert_eq!(backend.log.borrow().disposals, 1);
    }

    #[test]
    fn test_drop_releases_mounted_controller() {
        let (controller, backend) = mounted();
        drop(controller);
        assert_eq!(backend.log.borrow().disposals, 1);
    }

    #[test]
    fn test_disposed_controller_ignores_work() {
        let (mut controller, backend) = mounted();
        let _handle = controller.animate(|_, _| {});
        controller.release();

        controller.resize(640, 480);
        controller.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert!(!controller.tick().unwrap());
        assert!(controller.is_disposed());
        drop(controller);

        let log = backend.log.borrow();
        assert!(log.resizes.is_empty());
        assert!(log.frames.is_empty());
        assert_eq!(log.disposals, 1);
    }
}
