//! Two-window customizer: the garment alone and worn by a mannequin

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kitcrate_core::{Error, GarmentConfig, Result};
use kitcrate_geometry::ModelKind;
use kitcrate_gpu::{SceneRenderConfig, SceneRenderer};
use tracing::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowBuilder, WindowId};

use crate::customizer::{Command, Customizer};
use crate::orbit::InputEvent;
use crate::view::PreviewView;

pub const WINDOW_WIDTH: f64 = 800.0;
pub const WINDOW_HEIGHT: f64 = 500.0;

/// How often a pending logo load is checked
const LOGO_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Map a pressed key to a customizer command
pub fn key_command(key: &Key) -> Option<Command> {
    let Key::Character(text) = key else {
        return None;
    };
    match text.as_str() {
        "c" | "C" => Some(Command::NextColor),
        "p" | "P" => Some(Command::NextPattern),
        digit => match digit.parse::<usize>() {
            Ok(n @ 1..=5) => Some(Command::Preset(n - 1)),
            _ => None,
        },
    }
}

/// Turns one window's cursor and touch events into [`InputEvent`]s
#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<(f64, f64)>,
    touches: HashMap<u64, (f64, f64)>,
}

impl PointerTracker {
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> InputEvent {
        self.cursor = Some((x, y));
        InputEvent::PointerMove { x, y }
    }

    /// A press needs a known cursor position to anchor the drag
    pub fn button(&mut self, state: ElementState) -> Option<InputEvent> {
        match state {
            ElementState::Pressed => self.cursor.map(|(x, y)| InputEvent::PointerDown { x, y }),
            ElementState::Released => Some(InputEvent::PointerUp),
        }
    }

    pub fn cursor_left(&mut self) -> InputEvent {
        self.cursor = None;
        InputEvent::PointerLeave
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64) -> InputEvent {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, (x, y));
                InputEvent::TouchStart {
                    touches: self.touches.len(),
                    x,
                    y,
                }
            }
            TouchPhase::Moved => {
                self.touches.insert(id, (x, y));
                InputEvent::TouchMove {
                    touches: self.touches.len(),
                    x,
                    y,
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&id);
                InputEvent::TouchEnd
            }
        }
    }
}

struct PreviewWindow {
    window: Arc<Window>,
    view: PreviewView<SceneRenderer>,
    pointer: PointerTracker,
}

impl PreviewWindow {
    fn open(
        event_loop: &EventLoop<()>,
        kind: ModelKind,
        customizer: &Customizer,
        render_config: &SceneRenderConfig,
    ) -> Result<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(kind.title())
                .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
                .build(event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let size = window.inner_size();
        let renderer = pollster::block_on(SceneRenderer::new(window.clone(), render_config.clone()))?;
        let view = PreviewView::mount(
            renderer,
            size.width,
            size.height,
            kind,
            customizer.config(),
            customizer.logo(),
        )?;
        window.request_redraw();

        Ok(Self {
            window,
            view,
            pointer: PointerTracker::default(),
        })
    }

    fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.view.resize(size.width, size.height);
                self.window.request_redraw();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(input) = self.pointer.button(state) {
                    self.view.handle_input(input);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let input = self.pointer.cursor_moved(position.x, position.y);
                self.view.handle_input(input);
            }
            WindowEvent::CursorLeft { .. } => {
                let input = self.pointer.cursor_left();
                self.view.handle_input(input);
            }
            WindowEvent::Touch(Touch {
                id, phase, location, ..
            }) => {
                let input = self.pointer.touch(id, phase, location.x, location.y);
                self.view.handle_input(input);
            }
            WindowEvent::RedrawRequested => match self.view.tick() {
                Ok(true) => self.window.request_redraw(),
                Ok(false) => {}
                Err(e) => error!("{} failed to render: {}", self.view.kind(), e),
            },
            _ => {}
        }
    }
}

fn refresh_views(windows: &mut HashMap<WindowId, PreviewWindow>, customizer: &Customizer) {
    for preview in windows.values_mut() {
        if let Err(e) = preview.view.apply_config(customizer.config(), customizer.logo()) {
            error!("Failed to update {}: {}", preview.view.kind(), e);
        }
        preview.window.request_redraw();
    }
}

/// Winit host for the two live previews
pub struct CustomizerApp {
    customizer: Customizer,
    render_config: SceneRenderConfig,
}

impl CustomizerApp {
    pub fn new(config: GarmentConfig) -> Self {
        Self {
            customizer: Customizer::new(config),
            render_config: SceneRenderConfig::default(),
        }
    }

    pub fn with_render_config(mut self, render_config: SceneRenderConfig) -> Self {
        self.render_config = render_config;
        self
    }

    /// Open both windows and run until the last one closes
    pub fn run(self) -> Result<()> {
        let event_loop =
            EventLoop::new().map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;

        let mut customizer = self.customizer;
        let mut windows = HashMap::new();
        for kind in [ModelKind::GarmentOnly, ModelKind::Worn] {
            let preview = PreviewWindow::open(&event_loop, kind, &customizer, &self.render_config)?;
            windows.insert(preview.window.id(), preview);
        }
        info!("Drag to rotate; keys 1-5 apply presets, c cycles color, p cycles pattern");

        event_loop
            .run(move |event, target| match event {
                Event::WindowEvent {
                    window_id,
                    event: WindowEvent::CloseRequested,
                } => {
                    if let Some(preview) = windows.remove(&window_id) {
                        info!("Closing {}", preview.view.kind());
                        preview.view.dispose();
                    }
                    if windows.is_empty() {
                        target.exit();
                    }
                }
                Event::WindowEvent {
                    event: WindowEvent::KeyboardInput { event: key, .. },
                    ..
                } => {
                    if key.state != ElementState::Pressed {
                        return;
                    }
                    if let Some(command) = key_command(&key.logical_key) {
                        if customizer.execute(command) {
                            refresh_views(&mut windows, &customizer);
                        }
                    }
                }
                Event::WindowEvent { window_id, event } => {
                    if let Some(preview) = windows.get_mut(&window_id) {
                        preview.handle_event(event);
                    }
                }
                Event::AboutToWait => {
                    if customizer.poll_logo() {
                        refresh_views(&mut windows, &customizer);
                    }
                    target.set_control_flow(if customizer.is_logo_pending() {
                        ControlFlow::WaitUntil(Instant::now() + LOGO_POLL_INTERVAL)
                    } else {
                        ControlFlow::Wait
                    });
                }
                _ => {}
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_commands() {
        assert_eq!(key_command(&Key::Character("1".into())), Some(Command::Preset(0)));
        assert_eq!(key_command(&Key::Character("5".into())), Some(Command::Preset(4)));
        assert_eq!(key_command(&Key::Character("6".into())), None);
        assert_eq!(key_command(&Key::Character("0".into())), None);
        assert_eq!(key_command(&Key::Character("C".into())), Some(Command::NextColor));
        assert_eq!(key_command(&Key::Character("p".into())), Some(Command::NextPattern));
        assert_eq!(key_command(&Key::Character("x".into())), None);
    }

    #[test]
    fn test_press_without_cursor_is_dropped() {
        let mut pointer = PointerTracker::default();
        assert_eq!(pointer.button(ElementState::Pressed), None);

        pointer.cursor_moved(10.0, 20.0);
        assert_eq!(
            pointer.button(ElementState::Pressed),
            Some(InputEvent::PointerDown { x: 10.0, y: 20.0 })
        );
        assert_eq!(pointer.button(ElementState::Released), Some(InputEvent::PointerUp));

        assert_eq!(pointer.cursor_left(), InputEvent::PointerLeave);
        assert_eq!(pointer.button(ElementState::Pressed), None);
    }

    #[test]
    fn test_touch_counts() {
        let mut pointer = PointerTracker::default();
        assert_eq!(
            pointer.touch(7, TouchPhase::Started, 1.0, 2.0),
            InputEvent::TouchStart { touches: 1, x: 1.0, y: 2.0 }
        );
        assert_eq!(
            pointer.touch(8, TouchPhase::Started, 5.0, 5.0),
            InputEvent::TouchStart { touches: 2, x: 5.0, y: 5.0 }
        );
        assert_eq!(pointer.touch(8, TouchPhase::Cancelled, 5.0, 5.0), InputEvent::TouchEnd);
        assert_eq!(
            pointer.touch(7, TouchPhase::Moved, 3.0, 2.0),
            InputEvent::TouchMove { touches: 1, x: 3.0, y: 2.0 }
        );
    }
}
