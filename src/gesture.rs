//! Hand-landmark readings and gesture classification.
//!
//! The hand tracker is an external collaborator. Per processed video frame
//! it reports either nothing or 21 normalized image-space landmarks
//! (`x, y` in `[0, 1]`, origin top-left). This module turns those points
//! into a [`GestureReading`] and classifies it into a [`ModeEvent`].

use glam::Vec2;

use crate::config::GestureThresholds;
use crate::controller::ModeEvent;

/// Number of landmarks in a full hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
/// Middle-finger knuckle, used as the palm reference point.
pub const PALM: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertips that count toward openness.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// A validated set of hand landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Vec2; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Validate raw tracker output. Returns `None` for short or non-finite
    /// input, which callers treat as "no hand".
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let points: [Vec2; LANDMARK_COUNT] = points.get(..LANDMARK_COUNT)?.try_into().ok()?;
        points.iter().all(|p| p.is_finite()).then_some(Self { points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec2 {
        self.points[index]
    }

    /// Thumb-tip to index-tip distance.
    pub fn pinch_distance(&self) -> f32 {
        self.points[THUMB_TIP].distance(self.points[INDEX_TIP])
    }

    /// Mean wrist-to-fingertip distance over the four fingers.
    pub fn openness(&self) -> f32 {
        let wrist = self.points[WRIST];
        FINGERTIPS
            .iter()
            .map(|&tip| self.points[tip].distance(wrist))
            .sum::<f32>()
            / FINGERTIPS.len() as f32
    }

    /// Palm position remapped to `[-1, 1]` on both axes.
    pub fn palm_position(&self) -> Vec2 {
        (self.points[PALM] - Vec2::splat(0.5)) * 2.0
    }

    pub fn reading(&self) -> GestureReading {
        GestureReading {
            pinch: self.pinch_distance(),
            openness: self.openness(),
            palm: self.palm_position(),
        }
    }
}

/// Scalar features extracted from one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub pinch: f32,
    pub openness: f32,
    pub palm: Vec2,
}

impl GestureReading {
    /// Classify this reading. A pinch wins over openness.
    pub fn classify(&self, thresholds: &GestureThresholds) -> ModeEvent {
        if self.pinch < thresholds.pinch {
            ModeEvent::Pinch
        } else if self.openness < thresholds.fist {
            ModeEvent::Fist
        } else if self.openness > thresholds.open {
            ModeEvent::OpenHand
        } else {
            ModeEvent::Neutral
        }
    }
}

/// Gate that feeds video frames to the hand tracker.
///
/// At most one classification is in flight, and a frame timestamp already
/// seen is never processed again. Stale frames are skipped, not queued.
#[derive(Debug, Clone, Default)]
pub struct GesturePump {
    last_frame: Option<f64>,
    in_flight: bool,
}

impl GesturePump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the frame at `frame_time` for classification.
    ///
    /// Returns `false` if it was already processed or a classification is
    /// still pending.
    pub fn try_begin(&mut self, frame_time: f64) -> bool {
        if self.in_flight || self.last_frame == Some(frame_time) {
            return false;
        }
        self.last_frame = Some(frame_time);
        self.in_flight = true;
        true
    }

    /// Mark the pending classification as delivered.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    #[inline]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Forget all frame history, e.g. when the camera restarts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A synthetic hand with the wrist at (0.5, 0.9), fingertips `reach`
    /// away straight up, and the thumb tip `pinch` away from the index tip.
    pub(crate) fn hand(reach: f32, pinch: f32) -> Vec<Vec2> {
        let wrist = Vec2::new(0.5, 0.9);
        let mut points = vec![wrist; LANDMARK_COUNT];
        for (i, &tip) in FINGERTIPS.iter().enumerate() {
            points[tip] = Vec2::new(0.44 + i as f32 * 0.04, wrist.y - reach);
        }
        points[PALM] = Vec2::new(0.5, wrist.y - reach * 0.4);
        points[THUMB_TIP] = points[INDEX_TIP] + Vec2::new(-pinch, 0.0);
        points
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(HandLandmarks::from_points(&[]).is_none());
        assert!(HandLandmarks::from_points(&[Vec2::ZERO; 20]).is_none());

        let mut points = hand(0.3, 0.2);
        points[7] = Vec2::new(f32::NAN, 0.0);
        assert!(HandLandmarks::from_points(&points).is_none());
    }

    #[test]
    fn test_extra_points_ignored() {
        let mut points = hand(0.3, 0.2);
        points.push(Vec2::new(f32::NAN, f32::NAN));
        assert!(HandLandmarks::from_points(&points).is_some());
    }

    #[test]
    fn test_measurements() {
        let lm = HandLandmarks::from_points(&hand(0.3, 0.03)).unwrap();
        assert!((lm.pinch_distance() - 0.03).abs() < 1e-5);
        // Tips are spread horizontally, so openness is slightly above reach
        assert!(lm.openness() >= 0.3 && lm.openness() < 0.31);
        assert!((lm.palm_position() - Vec2::new(0.0, (0.78 - 0.5) * 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_classification_bands() {
        let t = GestureThresholds::default();
        let reading = |openness: f32, pinch: f32| GestureReading {
            pinch,
            openness,
            palm: Vec2::ZERO,
        };

        assert_eq!(reading(0.5, 0.03).classify(&t), ModeEvent::Pinch);
        assert_eq!(reading(0.1, 0.03).classify(&t), ModeEvent::Pinch);
        assert_eq!(reading(0.2, 0.2).classify(&t), ModeEvent::Fist);
        assert_eq!(reading(0.5, 0.2).classify(&t), ModeEvent::OpenHand);
        for openness in [0.25, 0.30, 0.35, 0.40] {
            assert_eq!(reading(openness, 0.2).classify(&t), ModeEvent::Neutral);
        }
    }

    #[test]
    fn test_pump_skips_repeated_and_overlapping_frames() {
        let mut pump = GesturePump::new();
        assert!(pump.try_begin(1.0));
        assert!(pump.is_in_flight());
        // Newer frame while one is pending is dropped
        assert!(!pump.try_begin(2.0));
        pump.finish();

        // Same frame is never reprocessed
        assert!(!pump.try_begin(1.0));
        assert!(pump.try_begin(3.0));
        pump.finish();

        pump.reset();
        assert!(pump.try_begin(3.0));
    }
}
