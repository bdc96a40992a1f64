//! Scene configuration: layout dimensions, gesture thresholds and easing rates.
//!
//! Every tunable of the choreography is a named constant with a matching
//! field on one of the config structs below. Configs can be assembled with
//! the `with_*` builder methods or loaded from JSON, where missing fields
//! fall back to the defaults.
//!
//! ```ignore
//! let config = SceneConfig::new()
//!     .with_decoration_count(800)
//!     .with_dust_count(0)
//!     .with_seed(7);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::state::SceneOptions;

// ========== Layout ==========

pub const TREE_HEIGHT: f32 = 24.0;
pub const TREE_RADIUS: f32 = 8.0;
pub const DECORATION_COUNT: u32 = 1500;
pub const DUST_COUNT: u32 = 2000;

// ========== Gestures ==========

/// Thumb-to-index distance (normalized image units) below which a pinch fires.
pub const PINCH_THRESHOLD: f32 = 0.05;
/// Mean wrist-to-fingertip distance below which the hand reads as a fist.
pub const FIST_THRESHOLD: f32 = 0.25;
/// Mean wrist-to-fingertip distance above which the hand reads as open.
pub const OPEN_THRESHOLD: f32 = 0.40;
/// Two taps closer than this are a double tap.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

// ========== Choreography ==========

pub const POSITION_RATE: f32 = 2.0;
pub const FOCUS_POSITION_RATE: f32 = 5.0;
pub const SETTLE_RATE: f32 = 1.0;
/// Idle spin about the vertical axis, radians per second.
pub const IDLE_SPIN: f32 = 0.5;
pub const SCALE_RATE: f32 = 4.0;
/// Absolute scale of the focused particle.
pub const FOCUS_SCALE: f32 = 4.5;
pub const FOCUS_BACKGROUND_FACTOR: f32 = 0.8;
pub const DISPERSED_PHOTO_FACTOR: f32 = 2.5;
/// Angular frequency of the ambient pulse, radians per second.
pub const PULSE_FREQUENCY: f32 = 4.0;
/// Distance in front of the viewer where the focused particle is placed.
pub const FOCUS_DISTANCE: f32 = 20.0;

// ========== Rig ==========

pub const RIG_RATE: f32 = 2.5;
pub const AUTO_ROTATE_SPEED: f32 = 0.2;
/// Yaw reached at full horizontal hand deflection, as a fraction of pi.
pub const STEER_YAW: f32 = 0.6;
/// Pitch reached at full vertical hand deflection, as a fraction of pi.
pub const STEER_PITCH: f32 = 0.25;

/// Dimensions and population of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLayout {
    pub height: f32,
    /// Radius at the base of the cone.
    pub radius: f32,
    /// Leaves, gifts and baubles.
    pub decoration_count: u32,
    pub dust_count: u32,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            height: TREE_HEIGHT,
            radius: TREE_RADIUS,
            decoration_count: DECORATION_COUNT,
            dust_count: DUST_COUNT,
        }
    }
}

/// Hand-gesture classification thresholds.
///
/// Openness values inside `[fist, open]` are a dead zone that leaves the
/// mode unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub pinch: f32,
    pub fist: f32,
    pub open: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch: PINCH_THRESHOLD,
            fist: FIST_THRESHOLD,
            open: OPEN_THRESHOLD,
        }
    }
}

/// Easing rates and scale factors used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyParams {
    pub position_rate: f32,
    pub focus_position_rate: f32,
    pub settle_rate: f32,
    pub idle_spin: f32,
    pub scale_rate: f32,
    pub focus_scale: f32,
    pub focus_background_factor: f32,
    pub dispersed_photo_factor: f32,
    pub pulse_frequency: f32,
    pub focus_distance: f32,
}

impl Default for ChoreographyParams {
    fn default() -> Self {
        Self {
            position_rate: POSITION_RATE,
            focus_position_rate: FOCUS_POSITION_RATE,
            settle_rate: SETTLE_RATE,
            idle_spin: IDLE_SPIN,
            scale_rate: SCALE_RATE,
            focus_scale: FOCUS_SCALE,
            focus_background_factor: FOCUS_BACKGROUND_FACTOR,
            dispersed_photo_factor: DISPERSED_PHOTO_FACTOR,
            pulse_frequency: PULSE_FREQUENCY,
            focus_distance: FOCUS_DISTANCE,
        }
    }
}

/// Scene-rig rotation smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigParams {
    pub rate: f32,
    pub auto_rotate_speed: f32,
    pub steer_yaw: f32,
    pub steer_pitch: f32,
}

impl Default for RigParams {
    fn default() -> Self {
        Self {
            rate: RIG_RATE,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
            steer_yaw: STEER_YAW,
            steer_pitch: STEER_PITCH,
        }
    }
}

/// Complete configuration of a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub tree: TreeLayout,
    pub gestures: GestureThresholds,
    pub choreography: ChoreographyParams,
    pub rig: RigParams,
    pub options: SceneOptions,
    pub double_tap_window_ms: u64,
    /// Seed for placement and focus selection. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree: TreeLayout::default(),
            gestures: GestureThresholds::default(),
            choreography: ChoreographyParams::default(),
            rig: RigParams::default(),
            options: SceneOptions::default(),
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_tree_size(mut self, height: f32, radius: f32) -> Self {
        self.tree.height = height;
        self.tree.radius = radius;
        self
    }

    pub fn with_decoration_count(mut self, count: u32) -> Self {
        self.tree.decoration_count = count;
        self
    }

    pub fn with_dust_count(mut self, count: u32) -> Self {
        self.tree.dust_count = count;
        self
    }

    pub fn with_gesture_thresholds(mut self, thresholds: GestureThresholds) -> Self {
        self.gestures = thresholds;
        self
    }

    pub fn with_choreography(mut self, params: ChoreographyParams) -> Self {
        self.choreography = params;
        self
    }

    pub fn with_rig(mut self, params: RigParams) -> Self {
        self.rig = params;
        self
    }

    pub fn with_options(mut self, options: SceneOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_double_tap_window_ms(mut self, window: u64) -> Self {
        self.double_tap_window_ms = window;
        self
    }

    /// Fix the random seed for reproducible layouts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
