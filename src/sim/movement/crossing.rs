//! Spoke crossing ("zip") movement
//!
//! Follows a spoke until progress passes a randomized threshold, then:
//! 1. Extension (1/3 s): stays put while a guide line grows toward the target spoke.
//! 2. Crossing (1/8 s, eased): slides across to the target spoke at the same `t`.
//!
//! Zigzaggers use the same algorithm with jumps of up to three spokes.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{MoveContext, MovementController, radial_fallback};
use crate::ease_in_out_quad;
use crate::scene::{Scene, Visual, VisualId};

const EXTENSION_RATE: f32 = 3.0;
const CROSSING_RATE: f32 = 8.0;

/// Where the controller is in a crossing cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossingPhase {
    Following,
    Extending { target: usize, progress: f32 },
    Crossing { target: usize, progress: f32 },
}

#[derive(Debug, Clone)]
pub struct SpokeCrossingMovement {
    spoke: usize,
    angle: f32,
    max_jump: usize,
    next_cross_at: f32,
    phase: CrossingPhase,
    /// Guide line endpoints while extending
    guide: Option<(Vec2, Vec2)>,
    zip: Option<VisualId>,
}

fn next_threshold(from: f32, rng: &mut Pcg32) -> f32 {
    from + 1.0 + rng.random::<f32>() * 2.0
}

impl SpokeCrossingMovement {
    fn new(spoke: usize, angle: f32, max_jump: usize, rng: &mut Pcg32) -> Self {
        Self {
            spoke,
            angle,
            max_jump: max_jump.max(1),
            next_cross_at: next_threshold(0.0, rng),
            phase: CrossingPhase::Following,
            guide: None,
            zip: None,
        }
    }

    /// Jumps to an adjacent spoke
    pub fn crossing(spoke: usize, angle: f32, rng: &mut Pcg32) -> Self {
        Self::new(spoke, angle, 1, rng)
    }

    /// Jumps up to three spokes at a time
    pub fn zigzag(spoke: usize, angle: f32, rng: &mut Pcg32) -> Self {
        Self::new(spoke, angle, 3, rng)
    }

    pub fn spoke(&self) -> usize {
        self.spoke
    }

    pub fn max_jump(&self) -> usize {
        self.max_jump
    }

    pub fn phase(&self) -> CrossingPhase {
        self.phase
    }

    pub fn next_cross_at(&self) -> f32 {
        self.next_cross_at
    }

    fn pick_target(&self, count: usize, rng: &mut Pcg32) -> usize {
        let jump = rng.random_range(1..=self.max_jump) as i64;
        let dir = if rng.random_bool(0.5) { 1 } else { -1 };
        (self.spoke as i64 + dir * jump).rem_euclid(count as i64) as usize
    }
}

impl MovementController for SpokeCrossingMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let count = ctx.level.spoke_count();
        let Some(current) = ctx.level.spoke(self.spoke).copied() else {
            self.phase = CrossingPhase::Following;
            self.guide = None;
            return radial_fallback(self.angle, ctx.progress);
        };
        self.spoke %= count;
        self.angle = current.angle;

        let t = ctx.progress / ctx.level.radius();
        let here = current.point_at(t);

        match self.phase {
            CrossingPhase::Following => {
                self.guide = None;
                if ctx.progress >= self.next_cross_at && count > 1 {
                    let target = self.pick_target(count, ctx.rng);
                    self.phase = CrossingPhase::Extending {
                        target,
                        progress: 0.0,
                    };
                    self.guide = Some((here, here));
                }
                here
            }
            CrossingPhase::Extending { target, progress } => {
                let progress = progress + ctx.dt * EXTENSION_RATE;
                let there = ctx.level.spoke(target).map_or(here, |s| s.point_at(t));
                if progress >= 1.0 {
                    self.guide = None;
                    self.phase = CrossingPhase::Crossing {
                        target,
                        progress: 0.0,
                    };
                } else {
                    self.guide = Some((here, here.lerp(there, progress)));
                    self.phase = CrossingPhase::Extending { target, progress };
                }
                here
            }
            CrossingPhase::Crossing { target, progress } => {
                let progress = progress + ctx.dt * CROSSING_RATE;
                let Some(target_spoke) = ctx.level.spoke(target).copied() else {
                    self.phase = CrossingPhase::Following;
                    return here;
                };
                let there = target_spoke.point_at(t);
                if progress >= 1.0 {
                    self.spoke = target % count;
                    self.angle = target_spoke.angle;
                    self.phase = CrossingPhase::Following;
                    self.next_cross_at = next_threshold(ctx.progress, ctx.rng);
                    there
                } else {
                    self.phase = CrossingPhase::Crossing { target, progress };
                    here.lerp(there, ease_in_out_quad(progress))
                }
            }
        }
    }

    fn angle(&self) -> f32 {
        self.angle
    }

    fn render(&mut self, scene: &mut dyn Scene) {
        match (self.guide, self.zip) {
            (Some((from, to)), None) => {
                self.zip = Some(scene.add(Visual::ZipLine { from, to }));
            }
            (Some((from, to)), Some(id)) => scene.update(id, Visual::ZipLine { from, to }),
            (None, Some(id)) => {
                scene.remove(id);
                self.zip = None;
            }
            (None, None) => {}
        }
    }

    fn cleanup(&mut self, scene: &mut dyn Scene) {
        if let Some(id) = self.zip.take() {
            scene.remove(id);
        }
        self.guide = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use super::*;
    use crate::scene::RecordingScene;

    const DT: f32 = 1.0 / 60.0;

    /// Step until the controller leaves `Following`, returning the target spoke
    fn run_to_extension(h: &mut Harness, m: &mut SpokeCrossingMovement) -> usize {
        for _ in 0..1000 {
            h.step(m, DT);
            if let CrossingPhase::Extending { target, .. } = m.phase() {
                return target;
            }
        }
        panic!("crossing never started");
    }

    #[test]
    fn test_crossing_cycle_lands_on_target() {
        let mut h = Harness::new(1);
        let mut m = SpokeCrossingMovement::crossing(0, 0.0, &mut h.rng);
        let target = run_to_extension(&mut h, &mut m);
        assert!(target == 1 || target == 15);

        while m.phase() != CrossingPhase::Following {
            h.step(&mut m, DT);
        }

        assert_eq!(m.spoke(), target);
        let t = h.progress / h.level.radius();
        let expected = h.level.spokes()[target].point_at(t);
        assert!((h.position - expected).length() < 1e-4);
        assert_eq!(m.angle(), h.level.spokes()[target].angle);
        assert!(m.next_cross_at() >= h.progress + 1.0);
    }

    #[test]
    fn test_extension_holds_lane_position() {
        let mut h = Harness::new(1);
        let mut m = SpokeCrossingMovement::crossing(4, 0.0, &mut h.rng);
        run_to_extension(&mut h, &mut m);
        for _ in 0..5 {
            let pos = h.step(&mut m, DT);
            if !matches!(m.phase(), CrossingPhase::Extending { .. }) {
                break;
            }
            let t = h.progress / h.level.radius();
            assert!((pos - h.level.spokes()[4].point_at(t)).length() < 1e-5);
        }
    }

    #[test]
    fn test_zigzag_jump_width() {
        let mut h = Harness::new(1);
        for seed_round in 0..20 {
            let mut m = SpokeCrossingMovement::zigzag(8, 0.0, &mut h.rng);
            h.progress = 0.0;
            h.position = Vec2::ZERO;
            let target = run_to_extension(&mut h, &mut m) as i64;
            let diff = (target - 8).rem_euclid(16);
            let jump = diff.min(16 - diff);
            assert!((1..=3).contains(&jump), "round {seed_round}: jump {jump}");
        }
    }

    #[test]
    fn test_zip_line_visual_lifecycle() {
        let mut h = Harness::new(1);
        let mut scene = RecordingScene::new();
        let mut m = SpokeCrossingMovement::crossing(0, 0.0, &mut h.rng);
        run_to_extension(&mut h, &mut m);
        m.render(&mut scene);
        assert_eq!(scene.zip_lines(), 1);

        h.step(&mut m, DT);
        m.render(&mut scene);
        assert_eq!(scene.zip_lines(), 1);

        m.cleanup(&mut scene);
        assert_eq!(scene.zip_lines(), 0);
    }

    #[test]
    fn test_guide_removed_after_extension() {
        let mut h = Harness::new(1);
        let mut scene = RecordingScene::new();
        let mut m = SpokeCrossingMovement::crossing(0, 0.0, &mut h.rng);
        run_to_extension(&mut h, &mut m);
        while matches!(m.phase(), CrossingPhase::Extending { .. }) {
            m.render(&mut scene);
            h.step(&mut m, DT);
        }
        m.render(&mut scene);
        assert_eq!(scene.zip_lines(), 0);
    }
}
