use std::cell::RefCell;
use std::rc::Rc;

use kitcrate_core::{GarmentConfig, Result};
use kitcrate_geometry::ModelKind;
use kitcrate_gpu::SceneFrame;
use kitcrate_visualization::{InputEvent, PreviewView, RenderBackend, MAX_PITCH};

#[derive(Default)]
struct Counts {
    frames: Vec<usize>,
    resizes: usize,
    disposals: usize,
}

#[derive(Clone, Default)]
struct CountingBackend(Rc<RefCell<Counts>>);

impl RenderBackend for CountingBackend {
    fn resize(&mut self, _width: u32, _height: u32) {
        self.0.borrow_mut().resizes += 1;
    }

    fn render(&mut self, frame: &SceneFrame<'_>) -> Result<()> {
        self.0.borrow_mut().frames.push(frame.items.len());
        Ok(())
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().disposals += 1;
    }
}

#[test]
fn worn_preview_runs_until_cancelled() {
    let backend = CountingBackend::default();
    let mut view = PreviewView::mount(backend.clone(), 640, 480, ModelKind::Worn, &GarmentConfig::default(), None).unwrap();

    view.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
    view.handle_input(InputEvent::PointerMove { x: 0.0, y: 5000.0 });
    view.handle_input(InputEvent::PointerUp);
    assert_eq!(view.controller().orbit().target().x, MAX_PITCH);

    for _ in 0..3 {
        assert!(view.tick().unwrap());
    }
    view.animation().cancel();
    assert!(!view.tick().unwrap());
    assert_eq!(backend.0.borrow().frames, vec![11, 11, 11]);

    view.resize(1024, 768);
    view.dispose();

    let counts = backend.0.borrow();
    assert_eq!(counts.resizes, 1);
    assert_eq!(counts.disposals, 1);
}

#[test]
fn dropped_preview_is_released() {
    let backend = CountingBackend::default();
    let view = PreviewView::mount(backend.clone(), 640, 480, ModelKind::GarmentOnly, &GarmentConfig::default(), None).unwrap();
    drop(view);
    assert_eq!(backend.0.borrow().disposals, 1);
}
