//! Level geometry
//!
//! Each level is a radially symmetric outline with evenly spaced spokes
//! (lanes from the center to the rim). The shape cycles through five types
//! as the level number increases.
//!
//! `radius_at` is the single source of truth for the outline: spoke outer
//! points, the player's rim position and the boundary test all use it.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{polar_to_cartesian, positive_angle};

/// Number of points on a star level
pub const STAR_POINTS: usize = 8;
/// Inner corner radius of a star, as a fraction of the level radius
pub const STAR_INNER_RATIO: f32 = 0.4;
/// Wave outline: relative amplitude of the rim ripple
pub const WAVE_AMPLITUDE: f32 = 0.1;
/// Wave outline: ripples around the rim
pub const WAVE_LOBES: f32 = 6.0;

/// Outline shape of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelType {
    Circle,
    Spiral,
    Star,
    Wave,
    PiSymbol,
}

impl LevelType {
    /// Shape for a 1-based level number
    pub fn for_level(level_number: u32) -> Self {
        match (level_number.max(1) - 1) % 5 {
            0 => LevelType::Circle,
            1 => LevelType::Spiral,
            2 => LevelType::Star,
            3 => LevelType::Wave,
            _ => LevelType::PiSymbol,
        }
    }

    pub fn spoke_count(&self) -> usize {
        match self {
            LevelType::Circle => 16,
            LevelType::Spiral => 20,
            LevelType::Star => STAR_POINTS,
            LevelType::Wave => 24,
            LevelType::PiSymbol => 18,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelType::Circle => "Circle",
            LevelType::Spiral => "Spiral",
            LevelType::Star => "Star",
            LevelType::Wave => "Wave",
            LevelType::PiSymbol => "Pi",
        }
    }
}

/// One radial lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spoke {
    pub angle: f32,
    pub inner: Vec2,
    pub outer: Vec2,
}

impl Spoke {
    /// Point at parameter `t` (0 = inner point, 1 = outer point)
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.inner.lerp(self.outer, t)
    }
}

/// The Pi glyph enemies trace on Pi levels, in level units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiGlyph {
    /// Height of the horizontal bar
    pub bar_y: f32,
    /// Bar runs from -half_width to +half_width
    pub bar_half_width: f32,
    /// x of the left, middle and right legs
    pub legs: [f32; 3],
}

/// Geometry of the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelGeometry {
    level_number: u32,
    level_type: LevelType,
    radius: f32,
    spokes: Vec<Spoke>,
}

impl LevelGeometry {
    /// Build the geometry for a level number; the radius is clamped positive
    pub fn new(level_number: u32, radius: f32) -> Self {
        let level_number = level_number.max(1);
        let level_type = LevelType::for_level(level_number);
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            crate::consts::LEVEL_RADIUS
        };

        let mut level = Self {
            level_number,
            level_type,
            radius,
            spokes: Vec::new(),
        };
        let count = level_type.spoke_count();
        level.spokes = (0..count)
            .map(|i| {
                let angle = i as f32 * TAU / count as f32;
                Spoke {
                    angle,
                    inner: Vec2::ZERO,
                    outer: level.outline_point(angle),
                }
            })
            .collect();
        level
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn spoke_count(&self) -> usize {
        self.spokes.len()
    }

    pub fn spokes(&self) -> &[Spoke] {
        &self.spokes
    }

    /// Spoke lookup that tolerates stale indices (wraps modulo the count)
    pub fn spoke(&self, index: usize) -> Option<&Spoke> {
        if self.spokes.is_empty() {
            None
        } else {
            self.spokes.get(index % self.spokes.len())
        }
    }

    /// Distance from the center to the outline along `angle`
    pub fn radius_at(&self, angle: f32) -> f32 {
        match self.level_type {
            LevelType::Circle | LevelType::Spiral | LevelType::PiSymbol => self.radius,
            LevelType::Star => {
                let sector = TAU / STAR_POINTS as f32;
                let half = sector / 2.0;
                // Angular distance to the nearest tip, 0 at a tip, 1 at an inner corner
                let offset = positive_angle(angle) % sector;
                let frac = (if offset > half { sector - offset } else { offset }) / half;
                self.radius * (1.0 + (STAR_INNER_RATIO - 1.0) * frac)
            }
            LevelType::Wave => self.radius * (1.0 + WAVE_AMPLITUDE * (WAVE_LOBES * angle).sin()),
        }
    }

    /// Outline radius relative to the nominal radius
    #[inline]
    pub fn outline_scale(&self, angle: f32) -> f32 {
        self.radius_at(angle) / self.radius
    }

    /// Point on the outline (where the player sits)
    pub fn outline_point(&self, angle: f32) -> Vec2 {
        polar_to_cartesian(self.radius_at(angle), angle)
    }

    /// True once a body of radius `extra_radius` lies entirely outside the outline
    pub fn is_beyond_boundary(&self, position: Vec2, extra_radius: f32) -> bool {
        let angle = position.y.atan2(position.x);
        position.length() - extra_radius > self.radius_at(angle)
    }

    /// Pi glyph layout for this level's radius
    pub fn pi_glyph(&self) -> PiGlyph {
        let r = self.radius;
        PiGlyph {
            bar_y: 0.45 * r,
            bar_half_width: 0.6 * r,
            legs: [-0.35 * r, 0.0, 0.35 * r],
        }
    }
}

/// Angle halfway between two adjacent star tips
pub fn star_corner_angle(tip_angle: f32) -> f32 {
    tip_angle + PI / STAR_POINTS as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_type_cycles() {
        assert_eq!(LevelType::for_level(1), LevelType::Circle);
        assert_eq!(LevelType::for_level(2), LevelType::Spiral);
        assert_eq!(LevelType::for_level(3), LevelType::Star);
        assert_eq!(LevelType::for_level(4), LevelType::Wave);
        assert_eq!(LevelType::for_level(5), LevelType::PiSymbol);
        assert_eq!(LevelType::for_level(6), LevelType::Circle);
        assert_eq!(LevelType::for_level(0), LevelType::Circle);
    }

    #[test]
    fn test_spoke_counts() {
        let expected = [16, 20, STAR_POINTS, 24, 18];
        for (i, count) in expected.iter().enumerate() {
            let level = LevelGeometry::new(i as u32 + 1, 10.0);
            assert_eq!(level.spoke_count(), *count);
        }
    }

    #[test]
    fn test_spokes_evenly_spaced_from_origin() {
        let level = LevelGeometry::new(1, 10.0);
        let step = TAU / 16.0;
        for (i, spoke) in level.spokes().iter().enumerate() {
            assert!((spoke.angle - i as f32 * step).abs() < 1e-5);
            assert_eq!(spoke.inner, Vec2::ZERO);
            assert!((spoke.outer.length() - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_stale_spoke_index_wraps() {
        let level = LevelGeometry::new(1, 10.0);
        assert_eq!(level.spoke(17), level.spoke(1));
    }

    #[test]
    fn test_circle_boundary() {
        let level = LevelGeometry::new(1, 10.0);
        assert!(!level.is_beyond_boundary(Vec2::new(9.9, 0.0), 0.0));
        assert!(level.is_beyond_boundary(Vec2::new(10.1, 0.0), 0.0));
        // Body still overlapping the rim is not beyond it
        assert!(!level.is_beyond_boundary(Vec2::new(10.3, 0.0), 0.5));
    }

    #[test]
    fn test_star_boundary_tips_and_corners() {
        let level = LevelGeometry::new(3, 10.0);
        assert!((level.radius_at(0.0) - 10.0).abs() < 1e-4);
        let corner = star_corner_angle(0.0);
        assert!((level.radius_at(corner) - 4.0).abs() < 1e-3);
        // 6 units out is inside at a tip, outside at a corner
        assert!(!level.is_beyond_boundary(Vec2::new(6.0, 0.0), 0.0));
        assert!(level.is_beyond_boundary(polar_to_cartesian(6.0, corner), 0.0));
    }

    #[test]
    fn test_wave_boundary_matches_outline() {
        let level = LevelGeometry::new(4, 10.0);
        for spoke in level.spokes() {
            let r = level.radius_at(spoke.angle);
            assert!((spoke.outer.length() - r).abs() < 1e-4);
            assert!(level.is_beyond_boundary(spoke.outer * 1.01, 0.0));
            assert!(!level.is_beyond_boundary(spoke.outer * 0.99, 0.0));
        }
    }

    #[test]
    fn test_invalid_radius_falls_back() {
        let level = LevelGeometry::new(1, f32::NAN);
        assert_eq!(level.radius(), crate::consts::LEVEL_RADIUS);
    }
}
