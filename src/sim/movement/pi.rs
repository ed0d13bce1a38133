//! Pi-glyph movement for Pi levels
//!
//! Normalized progress drives three phases: a radial approach (< 0.3), a
//! transit onto the glyph's bar (0.3 - 0.5), then a descent down one of the
//! three legs. Some enemies skip straight onto the bar above their leg.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{MoveContext, MovementController};
use crate::polar_to_cartesian;

const APPROACH_END: f32 = 0.3;
const TRANSIT_END: f32 = 0.5;
/// Leg descent in radii per unit of normalized progress
const DESCENT_RATE: f32 = 2.9;
/// Chance of spawning directly onto the glyph
pub const PI_DIRECT_CHANCE: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct PiSymbolMovement {
    start_angle: f32,
    /// 0 = left, 1 = middle, 2 = right
    leg: usize,
    direct: bool,
    angle: f32,
}

impl PiSymbolMovement {
    pub fn new(start_angle: f32, rng: &mut Pcg32) -> Self {
        let direct = rng.random_bool(PI_DIRECT_CHANCE);
        let leg = if direct {
            rng.random_range(0..3)
        } else {
            Self::leg_for_angle(start_angle)
        };
        Self {
            start_angle,
            leg,
            direct,
            angle: start_angle,
        }
    }

    /// Left leg for enemies starting on the left, right for the right, else middle
    pub fn leg_for_angle(angle: f32) -> usize {
        let c = angle.cos();
        if c < -0.33 {
            0
        } else if c > 0.33 {
            2
        } else {
            1
        }
    }

    pub fn leg(&self) -> usize {
        self.leg
    }

    pub fn is_direct(&self) -> bool {
        self.direct
    }
}

impl MovementController for PiSymbolMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let radius = ctx.level.radius();
        let glyph = ctx.level.pi_glyph();
        let leg_x = glyph.legs[self.leg.min(2)];
        let bar_point = Vec2::new(leg_x, glyph.bar_y);

        let mut norm = ctx.normalized();
        if self.direct {
            norm += TRANSIT_END;
        }

        let pos = if norm < APPROACH_END {
            polar_to_cartesian(ctx.progress, self.start_angle)
        } else if norm < TRANSIT_END {
            let s = (norm - APPROACH_END) / (TRANSIT_END - APPROACH_END);
            polar_to_cartesian(APPROACH_END * radius, self.start_angle).lerp(bar_point, s)
        } else {
            let drop = (norm - TRANSIT_END) * radius * DESCENT_RATE;
            Vec2::new(leg_x, glyph.bar_y - drop)
        };

        if pos.length_squared() > 0.0 {
            self.angle = pos.y.atan2(pos.x);
        }
        pos
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use super::*;
    use std::f32::consts::PI;

    fn radial(start: f32) -> PiSymbolMovement {
        PiSymbolMovement {
            start_angle: start,
            leg: PiSymbolMovement::leg_for_angle(start),
            direct: false,
            angle: start,
        }
    }

    #[test]
    fn test_leg_choice_by_angle() {
        assert_eq!(PiSymbolMovement::leg_for_angle(PI), 0);
        assert_eq!(PiSymbolMovement::leg_for_angle(PI / 2.0), 1);
        assert_eq!(PiSymbolMovement::leg_for_angle(0.0), 2);
    }

    #[test]
    fn test_three_phases() {
        let mut h = Harness::new(5);
        h.speed = 0.0;
        let mut m = radial(0.0);
        let glyph = h.level.pi_glyph();

        // Approach: radial along the start angle
        h.progress = 2.0;
        let p = h.step(&mut m, 1.0 / 60.0);
        assert!((p - Vec2::new(2.0, 0.0)).length() < 1e-5);

        // End of transit: on the bar above the right leg
        h.progress = 4.999;
        let p = h.step(&mut m, 1.0 / 60.0);
        assert!((p - Vec2::new(glyph.legs[2], glyph.bar_y)).length() < 0.05);

        // Descent: straight down the leg
        h.progress = 8.0;
        let p = h.step(&mut m, 1.0 / 60.0);
        assert!((p.x - glyph.legs[2]).abs() < 1e-5);
        assert!(p.y < glyph.bar_y);
    }

    #[test]
    fn test_descent_leaves_the_level() {
        let mut h = Harness::new(5);
        for start in [0.0, PI / 2.0, PI] {
            let mut m = radial(start);
            h.progress = 0.0;
            let mut escaped = false;
            for _ in 0..2000 {
                let p = h.step(&mut m, 1.0 / 60.0);
                if h.level.is_beyond_boundary(p, 0.0) {
                    escaped = true;
                    break;
                }
            }
            assert!(escaped, "start {start} never left");
        }
    }

    #[test]
    fn test_direct_spawn_starts_on_bar() {
        let mut h = Harness::new(5);
        h.speed = 0.0;
        let mut m = PiSymbolMovement {
            start_angle: 0.0,
            leg: 1,
            direct: true,
            angle: 0.0,
        };
        let p = h.step(&mut m, 1.0 / 60.0);
        let glyph = h.level.pi_glyph();
        assert!((p - Vec2::new(glyph.legs[1], glyph.bar_y)).length() < 1e-5);
    }
}
