//! The mode state machine.
//!
//! ```text
//!              open hand / tap empty / double tap
//!   ASSEMBLED ------------------------------------> DISPERSED
//!       ^  <------------------------------------       |
//!       |        fist / tap empty / double tap          |
//!       |                                               |
//!       |  fist, tap empty,       pinch, tap photo      |
//!       |  double tap, removal   +--------------+       |
//!       +------------------------|   FOCUSED    |<------+
//!                                +--------------+
//! ```
//!
//! Two input paths feed the machine and never both at once: hand gestures
//! when `gestures_enabled` is set, pointer taps otherwise. Every transition
//! out of FOCUSED goes through [`SharedState::set_mode`], which clears the
//! focus target.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::GestureThresholds;
use crate::gesture::HandLandmarks;
use crate::particle::ParticleId;
use crate::pointer::{PointerEvent, TapDetector, TapKind};
use crate::registry::ParticleRegistry;
use crate::state::{InputSignal, Mode, SharedState};

/// A classified input, independent of which path produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    /// Thumb and index tips touching.
    Pinch,
    /// Closed hand.
    Fist,
    /// Spread hand.
    OpenHand,
    /// A hand inside the openness dead zone.
    Neutral,
    /// Single tap on a photo.
    TapPhoto,
    /// Single tap on empty space.
    TapEmpty,
    /// Second tap within the double-tap window.
    DoubleTap,
}

/// Next mode after `event` in mode `previous`.
///
/// For [`ModeEvent::DoubleTap`], `previous` is the mode before the first tap
/// of the pair.
pub fn classify(previous: Mode, event: ModeEvent) -> Mode {
    match event {
        ModeEvent::Pinch | ModeEvent::TapPhoto => Mode::Focused,
        ModeEvent::Fist => Mode::Assembled,
        ModeEvent::OpenHand => Mode::Dispersed,
        ModeEvent::Neutral => previous,
        ModeEvent::TapEmpty | ModeEvent::DoubleTap => previous.toggled(),
    }
}

/// Applies gesture and pointer input to the shared state.
pub struct ModeController {
    thresholds: GestureThresholds,
    taps: TapDetector,
    rng: SmallRng,
}

impl ModeController {
    pub fn new(thresholds: GestureThresholds, double_tap_window: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            thresholds,
            taps: TapDetector::new(double_tap_window),
            rng,
        }
    }

    #[inline]
    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Apply one hand-tracker result.
    ///
    /// `None`, or landmarks that fail validation, mean no hand: the input
    /// signal is marked lost and the mode is left alone. Returns the
    /// classified event when a hand was seen. Ignored while gestures are
    /// disabled.
    pub fn handle_gesture(
        &mut self,
        state: &mut SharedState,
        registry: &ParticleRegistry,
        landmarks: Option<&[Vec2]>,
    ) -> Option<ModeEvent> {
        if !state.options.gestures_enabled {
            return None;
        }

        let Some(hand) = landmarks.and_then(HandLandmarks::from_points) else {
            state.input = state.input.lost();
            return None;
        };

        let reading = hand.reading();
        state.input = InputSignal::at(reading.palm.x, reading.palm.y);

        let event = reading.classify(&self.thresholds);
        log::trace!(
            "hand: pinch {:.3} openness {:.3} -> {:?}",
            reading.pinch,
            reading.openness,
            event
        );

        match event {
            ModeEvent::Pinch => {
                // Only the rising edge picks a target
                if state.mode() != Mode::Focused {
                    let target = self.pick_photo(registry);
                    state.focus(target);
                }
            }
            _ => {
                state.set_mode(classify(state.mode(), event));
            }
        }
        Some(event)
    }

    /// Apply one pointer event. Ignored while gestures are enabled.
    ///
    /// Returns the classified event for taps.
    pub fn handle_pointer(
        &mut self,
        state: &mut SharedState,
        registry: &ParticleRegistry,
        event: PointerEvent,
    ) -> Option<ModeEvent> {
        if state.options.gestures_enabled {
            return None;
        }

        match event {
            PointerEvent::Move { ndc } => {
                state.input = InputSignal::at(ndc.x, ndc.y);
                None
            }
            PointerEvent::Leave => {
                state.input = state.input.lost();
                None
            }
            PointerEvent::Tap { hit, at, .. } => match self.taps.register(at, state.mode()) {
                TapKind::Double { mode_before } => {
                    state.set_mode(classify(mode_before, ModeEvent::DoubleTap));
                    Some(ModeEvent::DoubleTap)
                }
                TapKind::Single => {
                    let photo = hit.filter(|&id| registry.get(id).is_some_and(|r| r.is_photo()));
                    match photo {
                        Some(id) => {
                            state.focus(Some(id));
                            Some(ModeEvent::TapPhoto)
                        }
                        None => {
                            state.set_mode(classify(state.mode(), ModeEvent::TapEmpty));
                            Some(ModeEvent::TapEmpty)
                        }
                    }
                }
            },
        }
    }

    /// Uniformly random PHOTO particle, or `None` if there are none.
    fn pick_photo(&mut self, registry: &ParticleRegistry) -> Option<ParticleId> {
        registry.photo_ids().choose(&mut self.rng).copied()
    }
}
