//! Pointer input from window events.
//!
//! [`Input`] turns raw winit window events (mouse and touch) into
//! [`PointerEvent`]s in normalized device coordinates. A press followed by a
//! release that barely moved counts as a tap; drags do not.
//!
//! # Usage
//!
//! ```ignore
//! // In the window event handler:
//! input.handle_event(&event, clock.wall_now());
//!
//! // Once per frame, before updating the scene:
//! scene.handle_input(&mut input);
//! ```

use std::time::Duration;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

use crate::pointer::PointerEvent;

/// Presses that move farther than this (in pixels) are drags, not taps.
const TAP_SLOP: f32 = 8.0;

/// Tracks pointer state and queues pointer events for the scene.
#[derive(Debug)]
pub struct Input {
    // Pointer position
    position: Vec2,
    ndc: Vec2,
    /// Where the current press started, if a button or finger is down.
    press_origin: Option<Vec2>,

    // Window size for NDC calculation
    window_size: (u32, u32),

    events: Vec<PointerEvent>,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            ndc: Vec2::ZERO,
            press_origin: None,
            window_size: (800, 600),
            events: Vec::new(),
        }
    }

    /// Get the pointer position in screen pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Get the pointer position in normalized device coordinates (-1 to 1).
    ///
    /// Origin is at center of window. X increases to the right, Y increases upward.
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Whether a button or finger is currently down.
    pub fn is_pressed(&self) -> bool {
        self.press_origin.is_some()
    }

    /// Take all events queued since the last call.
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Process a winit window event that happened at `at` (real time since
    /// start, see [`FrameClock::wall_now`](crate::FrameClock::wall_now)).
    pub fn handle_event(&mut self, event: &WindowEvent, at: Duration) {
        match event {
            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),

            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => self.leave(),

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.press(),
                ElementState::Released => self.release(at),
            },

            WindowEvent::Touch(touch) => {
                self.move_to(Vec2::new(touch.location.x as f32, touch.location.y as f32));
                match touch.phase {
                    TouchPhase::Started => self.press(),
                    TouchPhase::Ended => self.release(at),
                    TouchPhase::Cancelled => self.press_origin = None,
                    TouchPhase::Moved => {}
                }
            }

            _ => {}
        }
    }

    fn move_to(&mut self, position: Vec2) {
        self.position = position;

        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.ndc = Vec2::new(
                (position.x / w as f32) * 2.0 - 1.0,
                1.0 - (position.y / h as f32) * 2.0, // Y flipped
            );
        }
        self.events.push(PointerEvent::Move { ndc: self.ndc });
    }

    fn leave(&mut self) {
        self.press_origin = None;
        self.events.push(PointerEvent::Leave);
    }

    fn press(&mut self) {
        self.press_origin = Some(self.position);
    }

    fn release(&mut self, at: Duration) {
        if let Some(origin) = self.press_origin.take() {
            if origin.distance(self.position) <= TAP_SLOP {
                self.events.push(PointerEvent::Tap {
                    ndc: self.ndc,
                    hit: None,
                    at,
                });
            }
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
