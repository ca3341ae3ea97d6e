#![warn(missing_docs)]

//! Declarative configuration document for the knobcad generator.
//!
//! This crate defines the JSON-facing data model: the knob body, the
//! optional screw-hole cavity, pointer wedges, and the surface feature
//! families (knurling, splines, threads). It is purely declarative — no
//! geometry, just parameters. Generation is handled by the downstream
//! kernel crates.
//!
//! Missing optional fields are defaulted rather than rejected, so a
//! half-edited document always parses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("invalid knob config: {0}")]
    Json(#[from] serde_json::Error),
}

/// One control point of a revolution profile.
///
/// `height_ratio` is the vertical position as a fraction of the owning
/// body's height; `smoothing` in `[-1, 1]` bows the span that *ends* at
/// this segment (0 = straight chord, negative flips the easing direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSegment {
    /// Radius at this station in mm.
    pub radius: f64,
    /// Vertical position as a ratio of the body height, in `[0, 1]`.
    pub height_ratio: f64,
    /// Blend shaping for the span ending here.
    #[serde(default)]
    pub smoothing: f64,
}

impl ProfileSegment {
    /// Plain straight-chord segment.
    pub fn new(radius: f64, height_ratio: f64) -> Self {
        Self {
            radius,
            height_ratio,
            smoothing: 0.0,
        }
    }
}

/// Axisymmetric body parameters.
///
/// Either an explicit `segments` list or the legacy
/// `radius`/`topRadius`/`bottomRadius`/`balance`/`smoothing` fields; the
/// legacy form normalizes into a three-segment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BodyConfig {
    /// Total height in mm.
    pub height: f64,
    /// Radius at the balance point (legacy form).
    #[serde(default)]
    pub radius: Option<f64>,
    /// Radius at the top; defaults to `radius`.
    #[serde(default)]
    pub top_radius: Option<f64>,
    /// Radius at the bottom; defaults to `radius`.
    #[serde(default)]
    pub bottom_radius: Option<f64>,
    /// Lathe facet count; below 3 means a smooth lathe.
    #[serde(default)]
    pub sides: u32,
    /// Height ratio the `radius` segment sits at (legacy form).
    #[serde(default)]
    pub balance: Option<f64>,
    /// Profile smoothing for the legacy form, `[0, 1]`.
    #[serde(default)]
    pub smoothing: f64,
    /// Explicit profile control points; overrides the legacy fields.
    #[serde(default)]
    pub segments: Vec<ProfileSegment>,
}

impl BodyConfig {
    /// Facet count for the lathe, or `None` for a smooth revolution.
    pub fn lathe_sides(&self) -> Option<u32> {
        if self.sides >= 3 {
            Some(self.sides)
        } else {
            None
        }
    }

    /// The balance ratio, falling back to the caller's default
    /// (0.5 for bodies, 1.0 for cavities).
    pub fn balance_or(&self, default: f64) -> f64 {
        self.balance.unwrap_or(default)
    }

    /// Normalize into a sorted segment list padded with endpoints at
    /// ratio 0 and 1.
    ///
    /// The legacy fields expand to bottom/balance/top control points with
    /// the original generator's blend directions: the span up to the
    /// balance point eases out, the span above it eases in.
    pub fn profile_segments(&self, default_balance: f64) -> Vec<ProfileSegment> {
        let mut segments = if self.segments.is_empty() {
            let radius = self
                .radius
                .or(self.bottom_radius)
                .or(self.top_radius)
                .unwrap_or(0.0);
            let bottom = self.bottom_radius.unwrap_or(radius);
            let top = self.top_radius.unwrap_or(radius);
            let balance = self.balance_or(default_balance);
            vec![
                ProfileSegment::new(bottom, 0.0),
                ProfileSegment {
                    radius,
                    height_ratio: balance,
                    smoothing: -self.smoothing,
                },
                ProfileSegment {
                    radius: top,
                    height_ratio: 1.0,
                    smoothing: self.smoothing,
                },
            ]
        } else {
            self.segments.clone()
        };

        segments.sort_by(|a, b| a.height_ratio.total_cmp(&b.height_ratio));
        if let Some(first) = segments.first() {
            if first.height_ratio > 0.0 {
                segments.insert(0, ProfileSegment::new(first.radius, 0.0));
            }
        }
        if let Some(last) = segments.last() {
            if last.height_ratio < 1.0 {
                segments.push(ProfileSegment::new(last.radius, 1.0));
            }
        }
        segments
    }
}

/// Screw-hole cavity: a revolved shape like the body, plus a rigid
/// rotation and its own internal feature lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoleConfig {
    /// Cavity profile parameters (same shape as the body's).
    #[serde(flatten)]
    pub shape: BodyConfig,
    /// Rotation of the cavity around the vertical axis, radians.
    #[serde(default, alias = "angle")]
    pub angular_offset: f64,
    /// Splines/keys cut or grown on the cavity wall.
    #[serde(default)]
    pub splines: Vec<SplineConfig>,
    /// Internal threads (always subtractive).
    #[serde(default)]
    pub threads: Vec<ThreadConfig>,
}

/// A small wedge pointer attached near the body surface.
///
/// Never part of the boolean composite — purely an additive scene solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerConfig {
    /// Radial length of the wedge in mm.
    #[serde(default)]
    pub length: f64,
    /// Vertical extent of the wedge in mm.
    #[serde(default)]
    pub height: f64,
    /// Angular position around the axis, radians.
    #[serde(default)]
    pub angle: f64,
    /// Distance of the inner edge from the axis, mm.
    #[serde(default)]
    pub radial_offset: f64,
    /// Vertical center as a ratio of the body height.
    #[serde(default)]
    pub position: f64,
    /// Angular width at the inner edge, radians.
    #[serde(default = "default_width_start")]
    pub width_start: f64,
    /// Angular width at the outer edge, radians.
    #[serde(default)]
    pub width_end: f64,
}

fn default_width_start() -> f64 {
    std::f64::consts::PI / 10.0
}

/// Base shape instanced by the knurling placer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KnurlShape {
    /// Square pyramid, apex outward.
    #[default]
    Pyramid,
    /// Axis-aligned box.
    Rectangle,
    /// Circular stud.
    Cylinder,
    /// Circular stud tapering to a point.
    Cone,
    /// Triangular prism.
    Triangle,
}

/// Knurling: a grid of small instanced bumps over a band of the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnurlingConfig {
    /// Base shape to instance.
    #[serde(default)]
    pub shape: KnurlShape,
    /// Circumferential size of one bump, mm.
    #[serde(default, alias = "width")]
    pub size_x: f64,
    /// Vertical size of one bump, mm.
    #[serde(default, alias = "height")]
    pub size_y: f64,
    /// Radial protrusion of one bump, mm.
    #[serde(default)]
    pub depth: f64,
    /// Number of angular columns (capped at 100).
    #[serde(default)]
    pub radial_count: u32,
    /// Per-column vertical stagger, mm.
    #[serde(default)]
    pub vertical_offset: f64,
    /// Extra vertical gap between rows, mm.
    #[serde(default)]
    pub vertical_spacing: f64,
    /// How much of `depth` emerges from the surface (the rest is sunk).
    #[serde(default = "default_rise")]
    pub rise: f64,
    /// Band of the profile covered, as height ratios.
    #[serde(default = "default_range")]
    pub range: [f64; 2],
    /// Rotation of the base shape about its depth axis, radians.
    #[serde(default)]
    pub shape_rotation: f64,
    /// Fraction of the profile height over which bumps near the band
    /// edges shrink to nothing.
    #[serde(default)]
    pub depth_smoothing: f64,
}

fn default_rise() -> f64 {
    0.9
}

fn default_range() -> [f64; 2] {
    [0.0, 1.0]
}

fn default_scale() -> f64 {
    1.0
}

/// Longitudinal rib, spline tooth, or key.
///
/// `thickness`/`root_thickness` (radians) describe a trapezoidal tooth;
/// when `width` (mm) is given instead, the cross-section is a
/// constant-width key. `substractive` (spelling kept from the original
/// config files) turns the ribbon into a cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplineConfig {
    /// Number of ribbons evenly spaced around the axis.
    #[serde(default)]
    pub count: u32,
    /// Band of the profile covered, as height ratios.
    #[serde(default = "default_range")]
    pub range: [f64; 2],
    /// Radial height of the tooth, mm.
    #[serde(default)]
    pub height: f64,
    /// Angular thickness at the tip, radians.
    #[serde(default)]
    pub thickness: Option<f64>,
    /// Angular thickness at the root; defaults to `thickness`.
    #[serde(default)]
    pub root_thickness: Option<f64>,
    /// Constant key width in mm (selects the key cross-section).
    #[serde(default)]
    pub width: Option<f64>,
    /// Side-wall easing, `[-1, 1]`.
    #[serde(default)]
    pub smoothing: f64,
    /// Cross-section scale at the top end of the band.
    #[serde(default = "default_scale")]
    pub top_scale: f64,
    /// Cross-section scale at the bottom end of the band.
    #[serde(default = "default_scale")]
    pub bottom_scale: f64,
    /// Easing of the scale blend, sign selects direction.
    #[serde(default)]
    pub scale_smoothing: f64,
    /// Total twist from bottom to top of the band, radians.
    #[serde(default)]
    pub angle: f64,
    /// Easing of the twist, sign selects direction.
    #[serde(default)]
    pub angle_smoothing: f64,
    /// Register the ribbon as a cut instead of a decoration.
    #[serde(default)]
    pub substractive: bool,
}

/// Helical thread over a band of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadConfig {
    /// Height per full turn, mm.
    #[serde(default)]
    pub pitch: f64,
    /// Radial depth of the thread ridge, mm.
    #[serde(default)]
    pub depth: f64,
    /// Reverse the winding direction.
    #[serde(default)]
    pub left_handed: bool,
    /// Band of the profile covered, as height ratios.
    #[serde(default = "default_range")]
    pub range: [f64; 2],
    /// Fraction of the band over which the ridge fades in at the top.
    #[serde(default)]
    pub taper_top: f64,
    /// Fraction of the band over which the ridge fades in at the bottom.
    #[serde(default)]
    pub taper_bottom: f64,
}

/// Decorations applied to the outer body surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceConfig {
    /// Knurling patches.
    #[serde(default)]
    pub knurling: Vec<KnurlingConfig>,
    /// Surface splines/ribs.
    #[serde(default)]
    pub splines: Vec<SplineConfig>,
    /// External threads.
    #[serde(default)]
    pub threads: Vec<ThreadConfig>,
}

/// The full knob document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KnobConfig {
    /// The outer body.
    pub body: BodyConfig,
    /// Pointer wedges.
    #[serde(default)]
    pub pointers: Vec<PointerConfig>,
    /// Optional screw-hole cavity.
    #[serde(default)]
    pub screw_hole: Option<HoleConfig>,
    /// Outer surface decorations.
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl KnobConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
