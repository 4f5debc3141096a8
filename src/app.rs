use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{debug, info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::assets::LessonAssets;
use crate::config::LessonConfig;
use crate::input::{InputState, KeyCode, MouseButton, NamedKey};
use crate::render::Renderer;
use crate::scene::LessonScene;

/// Frame deltas are capped so a stall does not teleport the camera.
const MAX_FRAME_DELTA: f32 = 0.1;

/// The windowing system is unavailable (no display, missing libraries).
#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
pub struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_error(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

/// Opens the lesson window and runs its loop until the window closes or Escape is pressed.
pub fn run(config: LessonConfig) -> Result<()> {
    let assets = LessonAssets::load(&config)?;
    for line in assets.summary() {
        info!("{line}");
    }

    let event_loop =
        EventLoop::new().map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LessonApp::new(config, assets);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    info!("rendered {} frame(s)", app.frames);
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct LessonApp {
    config: LessonConfig,
    assets: LessonAssets,
    scene: LessonScene,
    input: InputState,
    renderer: Option<Renderer>,
    last_frame: Option<Instant>,
    cursor_grabbed: bool,
    frames: u64,
    last_error: Option<anyhow::Error>,
}

impl LessonApp {
    fn new(config: LessonConfig, assets: LessonAssets) -> Self {
        Self {
            scene: LessonScene::new(&config),
            config,
            assets,
            input: InputState::new(),
            renderer: None,
            last_frame: None,
            cursor_grabbed: false,
            frames: 0,
            last_error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window_title())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| WindowInitError::from_error("window", err))?;
        block_on(Renderer::new(
            Arc::new(window),
            &self.assets,
            self.config.clear_color,
        ))
    }

    fn wants_cursor_grab(&self) -> bool {
        self.config.lesson.uses_fps_camera()
    }

    fn set_cursor_grab(&mut self, grab: bool) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let window = renderer.window();
        let result = if grab {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        match result {
            Ok(()) => {
                window.set_cursor_visible(!grab);
                self.cursor_grabbed = grab;
            }
            Err(err) => warn!("unable to change cursor grab: {err}"),
        }
    }

    fn handle_keyboard(
        &mut self,
        event_loop: &ActiveEventLoop,
        key: PhysicalKey,
        state: ElementState,
    ) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(keycode) = map_keycode(code) else {
            return;
        };
        match state {
            ElementState::Pressed => {
                if keycode == KeyCode::Named(NamedKey::Escape) {
                    event_loop.exit();
                    return;
                }
                self.input.set_key_down(keycode);
            }
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let button = match button {
            WinitMouseButton::Left => MouseButton::LEFT,
            WinitMouseButton::Right => MouseButton::RIGHT,
            WinitMouseButton::Middle => MouseButton::new(2),
            WinitMouseButton::Back => MouseButton::new(3),
            WinitMouseButton::Forward => MouseButton::new(4),
            WinitMouseButton::Other(value) => MouseButton::new(value.min(u8::MAX as u16) as u8),
        };
        match state {
            ElementState::Pressed => {
                self.input.set_mouse_button_down(button);
                if button == MouseButton::LEFT && self.wants_cursor_grab() && !self.cursor_grabbed
                {
                    self.set_cursor_grab(true);
                }
            }
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0)
            .min(MAX_FRAME_DELTA);
        self.last_frame = Some(now);

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        self.scene.update(dt, &self.input);
        let frame = self.scene.frame_uniforms(renderer.aspect());
        match renderer.render(&frame) {
            Ok(()) => self.frames += 1,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated; reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(other) => warn!("skipping frame: {other}"),
        }
        Ok(())
    }
}

impl ApplicationHandler for LessonApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                renderer.window().request_redraw();
                self.renderer = Some(renderer);
                if self.wants_cursor_grab() {
                    self.set_cursor_grab(true);
                }
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match self.renderer.as_ref() {
            Some(renderer) if renderer.window_id() == window_id => {}
            _ => return,
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_keyboard(event_loop, event.physical_key, event.state);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .set_mouse_position(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Focused(false) => {
                self.input.clear();
                if self.cursor_grabbed {
                    self.set_cursor_grab(false);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.cursor_grabbed {
                self.input.add_mouse_motion(Vec2::new(dx as f32, dy as f32));
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    use WinitKey as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter => KeyCode::Named(NamedKey::Enter),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_movement_keys() {
        assert_eq!(map_keycode(WinitKey::KeyW), Some(KeyCode::Character('W')));
        assert_eq!(
            map_keycode(WinitKey::ShiftLeft),
            Some(KeyCode::Named(NamedKey::LeftShift))
        );
        assert_eq!(map_keycode(WinitKey::F5), None);
    }

    #[test]
    fn window_errors_name_the_stage() {
        let err = WindowInitError::from_error("window", "no display");
        assert_eq!(err.to_string(), "failed to initialize window: no display");
    }
}
