#![warn(missing_docs)]

//! Revolution profiles: the tessellated 2D side curve of a body or
//! cavity plus its cumulative arc-length table.
//!
//! A [`Profile`] is immutable once built. Every feature builder
//! addresses the surface through it, either by arc-length distance
//! ([`Profile::info_at`]) or by height ratio ([`Profile::distance_at`]),
//! so knurling and ribbons follow tapered profiles without knowing how
//! the curve was produced.

use knobcad_config::{BodyConfig, ProfileSegment};
use knobcad_math::{smooth, span_ratio, Point2, Tolerance};

/// Tessellation density of smoothed profile spans, points per mm.
pub const TESSELLATION_DENSITY: f64 = 1.0;

/// Position and orientation of one point on the side curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Radius (distance from the revolution axis), mm.
    pub x: f64,
    /// Height above the profile base, mm.
    pub y: f64,
    /// Surface slope: 0 for a vertical wall, positive when the wall
    /// leans outward going up.
    pub tangent_angle: f64,
    /// Table slot that bracketed the query; pass back as the hint for
    /// the next monotonically increasing query.
    pub slot: usize,
}

/// A tessellated revolution cross-section with its arc-length table.
#[derive(Debug, Clone)]
pub struct Profile {
    side: Vec<Point2>,
    lengths: Vec<f64>,
    height: f64,
}

impl Profile {
    /// Build from a normalized segment list and an absolute height.
    ///
    /// Smoothed spans tessellate the chord at [`TESSELLATION_DENSITY`]
    /// using the power-law blend on the radius while the height advances
    /// linearly; straight spans emit their endpoints only.
    pub fn new(segments: &[ProfileSegment], height: f64) -> Self {
        let mut side: Vec<Point2> = Vec::new();
        if let Some(first) = segments.first() {
            side.push(Point2::new(first.radius, first.height_ratio * height));
        }
        for pair in segments.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let p0 = Point2::new(from.radius, from.height_ratio * height);
            let p1 = Point2::new(to.radius, to.height_ratio * height);
            // the span takes its shaping from the segment it ends at
            let smoothing = to.smoothing;
            if smoothing.abs() < Tolerance::DEFAULT.linear {
                side.push(p1);
                continue;
            }
            let chord = (p1 - p0).norm();
            let steps = ((chord * TESSELLATION_DENSITY).round() as usize).max(2);
            for i in 1..=steps {
                let t = i as f64 / steps as f64;
                let blended = smooth(t, smoothing.abs(), smoothing < 0.0);
                side.push(Point2::new(
                    p0.x + (p1.x - p0.x) * blended,
                    p0.y + (p1.y - p0.y) * t,
                ));
            }
        }

        let mut lengths = Vec::with_capacity(side.len());
        let mut total = 0.0;
        for (i, p) in side.iter().enumerate() {
            if i > 0 {
                total += (p - side[i - 1]).norm();
            }
            lengths.push(total);
        }

        let height = match (side.first(), side.last()) {
            (Some(a), Some(b)) => b.y - a.y,
            _ => 0.0,
        };
        Self {
            side,
            lengths,
            height,
        }
    }

    /// Build a body or cavity profile from its configuration.
    ///
    /// `default_balance` is 0.5 for bodies and 1.0 for cavities.
    pub fn from_body(config: &BodyConfig, default_balance: f64) -> Self {
        Self::new(&config.profile_segments(default_balance), config.height)
    }

    /// Total vertical extent of the side curve, mm.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Total arc length of the side curve, mm.
    pub fn arc_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Whether the profile encloses nothing. A zero-length curve is the
    /// normal "no hole" signal for an absent or collapsed cavity.
    pub fn is_zero_length(&self) -> bool {
        self.arc_length() < Tolerance::DEFAULT.linear
    }

    /// Whether every point sits at the same radius.
    pub fn is_cylinder(&self) -> bool {
        match self.side.first() {
            Some(first) => self
                .side
                .iter()
                .all(|p| (p.x - first.x).abs() < Tolerance::DEFAULT.linear),
            None => true,
        }
    }

    /// The raw side curve, bottom to top, excluding axis points.
    pub fn side_points(&self) -> &[Point2] {
        &self.side
    }

    /// The closed axis-to-axis loop for the lathe: axis point at the
    /// base height, the side curve, axis point at the final height.
    pub fn shape_loop(&self) -> Vec<Point2> {
        let mut loop_points = Vec::with_capacity(self.side.len() + 2);
        if let (Some(first), Some(last)) = (self.side.first(), self.side.last()) {
            loop_points.push(Point2::new(0.0, first.y));
            loop_points.extend_from_slice(&self.side);
            loop_points.push(Point2::new(0.0, last.y));
        }
        loop_points
    }

    /// Position and slope at an arc-length `distance` along the side
    /// curve. `hint` restarts the bracketing scan at a previous result's
    /// slot; queries walking the curve upward stay O(1) per step.
    pub fn info_at(&self, distance: f64, hint: Option<usize>) -> SurfaceInfo {
        if self.side.len() < 2 {
            let p = self.side.first().copied().unwrap_or(Point2::origin());
            return SurfaceInfo {
                x: p.x,
                y: p.y,
                tangent_angle: 0.0,
                slot: 0,
            };
        }

        let mut slot = match hint {
            Some(h) if h < self.lengths.len() - 1 && self.lengths[h] <= distance => h,
            _ => 0,
        };
        while slot < self.lengths.len() - 2 && self.lengths[slot + 1] < distance {
            slot += 1;
        }

        let (p0, p1) = (self.side[slot], self.side[slot + 1]);
        let ratio = span_ratio(distance, self.lengths[slot], self.lengths[slot + 1]).clamp(0.0, 1.0);
        let delta = p1 - p0;
        SurfaceInfo {
            x: p0.x + delta.x * ratio,
            y: p0.y + delta.y * ratio,
            tangent_angle: delta.y.atan2(delta.x) - std::f64::consts::FRAC_PI_2,
            slot,
        }
    }

    /// Arc-length distance of the point at `height_ratio` of the total
    /// height, the inverse of [`Profile::info_at`] within tessellation
    /// resolution.
    pub fn distance_at(&self, height_ratio: f64) -> f64 {
        if self.side.len() < 2 {
            return 0.0;
        }
        let base = self.side[0].y;
        let target = base + height_ratio * self.height;

        let mut slot = 0;
        while slot < self.side.len() - 2 && self.side[slot + 1].y < target {
            slot += 1;
        }
        let (p0, p1) = (self.side[slot], self.side[slot + 1]);
        let ratio = span_ratio(target, p0.y, p1.y).clamp(0.0, 1.0);
        self.lengths[slot] + (self.lengths[slot + 1] - self.lengths[slot]) * ratio
    }

    /// Cumulative arc-length table, parallel to [`Profile::side_points`].
    pub fn length_table(&self) -> &[f64] {
        &self.lengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cylinder(radius: f64, height: f64) -> Profile {
        Profile::new(
            &[
                ProfileSegment::new(radius, 0.0),
                ProfileSegment::new(radius, 1.0),
            ],
            height,
        )
    }

    #[test]
    fn cylinder_arc_length_and_midpoint() {
        let profile = cylinder(10.0, 30.0);
        assert_relative_eq!(profile.arc_length(), 30.0);
        let info = profile.info_at(15.0, None);
        assert_relative_eq!(info.x, 10.0);
        assert_relative_eq!(info.y, 15.0);
        assert_relative_eq!(info.tangent_angle, 0.0);
        assert!(profile.is_cylinder());
    }

    #[test]
    fn length_table_is_non_decreasing() {
        let profile = Profile::new(
            &[
                ProfileSegment::new(12.0, 0.0),
                ProfileSegment {
                    radius: 15.0,
                    height_ratio: 0.4,
                    smoothing: -0.7,
                },
                ProfileSegment {
                    radius: 8.0,
                    height_ratio: 1.0,
                    smoothing: 0.9,
                },
            ],
            40.0,
        );
        for pair in profile.length_table().windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(!profile.is_cylinder());
    }

    #[test]
    fn distance_and_info_are_inverses() {
        let profile = Profile::new(
            &[
                ProfileSegment::new(10.0, 0.0),
                ProfileSegment {
                    radius: 14.0,
                    height_ratio: 0.5,
                    smoothing: 0.6,
                },
                ProfileSegment::new(9.0, 1.0),
            ],
            25.0,
        );
        for ratio in [0.0, 0.2, 0.5, 0.8, 1.0] {
            let d = profile.distance_at(ratio);
            let info = profile.info_at(d, None);
            assert_relative_eq!(info.y, ratio * profile.height(), epsilon = 1e-6);
        }
    }

    #[test]
    fn hint_walks_forward() {
        let profile = cylinder(5.0, 20.0);
        let first = profile.info_at(2.0, None);
        let second = profile.info_at(18.0, Some(first.slot));
        assert_relative_eq!(second.y, 18.0);
    }

    #[test]
    fn smoothing_bows_the_radius() {
        let straight = Profile::new(
            &[
                ProfileSegment::new(5.0, 0.0),
                ProfileSegment::new(15.0, 1.0),
            ],
            20.0,
        );
        let eased = Profile::new(
            &[
                ProfileSegment::new(5.0, 0.0),
                ProfileSegment {
                    radius: 15.0,
                    height_ratio: 1.0,
                    smoothing: 0.8,
                },
            ],
            20.0,
        );
        let mid_straight = straight.info_at(straight.distance_at(0.5), None);
        let mid_eased = eased.info_at(eased.distance_at(0.5), None);
        // ease-in holds the radius near the start value for longer
        assert!(mid_eased.x < mid_straight.x - 1.0);
    }

    #[test]
    fn zero_length_profile_signals_no_hole() {
        let profile = Profile::new(
            &[
                ProfileSegment::new(0.0, 0.0),
                ProfileSegment::new(0.0, 1.0),
            ],
            0.0,
        );
        assert!(profile.is_zero_length());
    }

    #[test]
    fn legacy_body_config_produces_three_span_profile() {
        let body = BodyConfig {
            height: 30.0,
            radius: Some(15.0),
            ..Default::default()
        };
        let profile = Profile::from_body(&body, 0.5);
        assert_relative_eq!(profile.height(), 30.0);
        assert_relative_eq!(profile.arc_length(), 30.0);
        assert!(profile.is_cylinder());
    }

    #[test]
    fn shape_loop_closes_onto_the_axis() {
        let profile = cylinder(10.0, 30.0);
        let loop_points = profile.shape_loop();
        assert_relative_eq!(loop_points.first().unwrap().x, 0.0);
        assert_relative_eq!(loop_points.last().unwrap().x, 0.0);
        assert_relative_eq!(loop_points.last().unwrap().y, 30.0);
    }
}
