//! The rendering seam between the scene controller and the GPU

use kitcrate_core::Result;
use kitcrate_gpu::{SceneFrame, SceneRenderer};

/// Something a [`SceneController`](crate::SceneController) can draw through
pub trait RenderBackend {
    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &SceneFrame<'_>) -> Result<()>;

    /// Release every resource; the controller calls this once
    fn dispose(&mut self);
}

impl RenderBackend for SceneRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        SceneRenderer::resize(self, width, height);
    }

    fn render(&mut self, frame: &SceneFrame<'_>) -> Result<()> {
        SceneRenderer::render(self, frame)
    }

    fn dispose(&mut self) {
        SceneRenderer::dispose(self);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use kitcrate_core::{Result, Rgb, TextureId};
    use kitcrate_gpu::SceneFrame;

    use super::RenderBackend;

    #[derive(Debug, Clone)]
    pub struct FrameRecord {
        pub items: usize,
        pub textures: HashSet<TextureId>,
        pub background: Rgb,
    }

    #[derive(Debug, Default)]
    pub struct BackendLog {
        pub resizes: Vec<(u32, u32)>,
        pub frames: Vec<FrameRecord>,
        pub disposals: usize,
    }

    /// Records every call; clones share one log
    #[derive(Debug, Clone, Default)]
    pub struct RecordingBackend {
        pub log: Rc<RefCell<BackendLog>>,
    }

    impl RenderBackend for RecordingBackend {
        fn resize(&mut self, width: u32, height: u32) {
            self.log.borrow_mut().resizes.push((width, height));
        }

        fn render(&mut self, frame: &SceneFrame<'_>) -> Result<()> {
            self.log.borrow_mut().frames.push(FrameRecord {
                items: frame.items.len(),
                textures: frame.texture_ids(),
                background: frame.background,
            });
            Ok(())
        }

        fn dispose(&mut self) {
            self.log.borrow_mut().disposals += 1;
        }
    }
}
