//! Landmark index scheme
//!
//! Indices follow the 33-point MediaPipe Pose numbering produced by the
//! upstream pose estimator.

use crate::types::{LandmarkFrame, Point2};

pub const NOSE: usize = 0;
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Total landmarks in a full skeleton
pub const LANDMARK_COUNT: usize = 33;

/// Default minimum visibility for a landmark to be considered present
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.5;

/// Read-only view over a frame that only yields resolvable landmarks
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    frame: &'a LandmarkFrame,
    min_visibility: f64,
}

impl<'a> FrameView<'a> {
    pub fn new(frame: &'a LandmarkFrame, min_visibility: f64) -> Self {
        Self {
            frame,
            min_visibility,
        }
    }

    /// Position of a landmark, or `None` if it is missing or not visible enough
    pub fn point(&self, index: usize) -> Option<Point2> {
        self.frame
            .get(index)
            .filter(|p| p.is_resolvable(self.min_visibility))
            .map(|p| p.position())
    }

    /// Midpoint of a left/right pair, only when both sides resolve
    pub fn pair_midpoint(&self, left: usize, right: usize) -> Option<Point2> {
        Some(Point2::midpoint(self.point(left)?, self.point(right)?))
    }

    /// Distance between a left/right pair, only when both sides resolve
    pub fn pair_width(&self, left: usize, right: usize) -> Option<f64> {
        Some(self.point(left)?.distance_to(self.point(right)?))
    }
}

impl<'a> From<&'a LandmarkFrame> for FrameView<'a> {
    fn from(frame: &'a LandmarkFrame) -> Self {
        Self::new(frame, DEFAULT_MIN_VISIBILITY)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic skeletons shared by module tests

    use super::*;
    use crate::types::LandmarkPoint;

    /// Builds a full-length frame with every landmark hidden, then lets callers
    /// place the joints they care about.
    pub struct FrameBuilder {
        points: Vec<LandmarkPoint>,
    }

    impl FrameBuilder {
        pub fn empty() -> Self {
            Self {
                points: vec![LandmarkPoint::new(0.0, 0.0).with_visibility(0.0); LANDMARK_COUNT],
            }
        }

        /// Upright, front-facing neutral pose: level shoulders, ears centered,
        /// vertical trunk, elbows at 90°, straight knees.
        pub fn neutral() -> Self {
            Self::empty()
                .set(NOSE, 0.5, 0.15)
                .set(LEFT_EAR, 0.47, 0.18)
                .set(RIGHT_EAR, 0.53, 0.18)
                .set(LEFT_SHOULDER, 0.4, 0.3)
                .set(RIGHT_SHOULDER, 0.6, 0.3)
                .set(LEFT_ELBOW, 0.4, 0.45)
                .set(RIGHT_ELBOW, 0.6, 0.45)
                .set(LEFT_WRIST, 0.3, 0.45)
                .set(RIGHT_WRIST, 0.7, 0.45)
                .set(LEFT_HIP, 0.42, 0.6)
                .set(RIGHT_HIP, 0.58, 0.6)
                .set(LEFT_KNEE, 0.42, 0.75)
                .set(RIGHT_KNEE, 0.58, 0.75)
                .set(LEFT_ANKLE, 0.42, 0.9)
                .set(RIGHT_ANKLE, 0.58, 0.9)
        }

        pub fn set(mut self, index: usize, x: f64, y: f64) -> Self {
            self.points[index] = LandmarkPoint::new(x, y).with_visibility(0.99);
            self
        }

        pub fn hide(mut self, index: usize) -> Self {
            self.points[index].visibility = Some(0.0);
            self
        }

        pub fn build(self) -> LandmarkFrame {
            LandmarkFrame::new(self.points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::FrameBuilder;
    use super::*;

    #[test]
    fn test_view_filters_low_visibility() {
        let frame = FrameBuilder::neutral().hide(LEFT_EAR).build();
        let view = FrameView::from(&frame);

        assert!(view.point(LEFT_EAR).is_none());
        assert!(view.point(RIGHT_EAR).is_some());
        assert!(view.pair_midpoint(LEFT_EAR, RIGHT_EAR).is_none());
    }

    #[test]
    fn test_view_handles_short_frames() {
        let frame = LandmarkFrame::new(FrameBuilder::neutral().build().points()[..13].to_vec());
        let view = FrameView::from(&frame);

        assert!(view.point(RIGHT_SHOULDER).is_some());
        assert!(view.point(LEFT_HIP).is_none());
    }

    #[test]
    fn test_pair_width() {
        let frame = FrameBuilder::neutral().build();
        let view = FrameView::from(&frame);
        let width = view.pair_width(LEFT_SHOULDER, RIGHT_SHOULDER).unwrap();
        assert!((width - 0.2).abs() < 1e-9);
    }
}
