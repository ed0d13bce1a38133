//! Scene collaborator
//!
//! The renderer owns meshes; the simulation only asks for handles to be added,
//! updated or removed. Entity positions are read back from simulation state
//! each frame, so only auxiliary visuals carry geometry here.

use std::collections::BTreeMap;

use glam::Vec2;

/// Opaque handle to a renderer-owned visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualId(pub u32);

/// What a handle stands for
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// Enemy body mesh, tinted white while flashing
    Enemy { enemy_id: u32, type_id: u8, color: u32 },
    /// Floating health bar over a multi-hit enemy
    HealthBar { enemy_id: u32, fraction: f32 },
    /// Bullet or bomb
    Bullet { enemy_owned: bool, bomb: bool },
    /// Guide line drawn while an enemy jumps between spokes
    ZipLine { from: Vec2, to: Vec2 },
}

/// Scene graph operations used by the simulation
pub trait Scene {
    fn add(&mut self, visual: Visual) -> VisualId;
    fn update(&mut self, id: VisualId, visual: Visual);
    fn remove(&mut self, id: VisualId);
}

/// In-memory scene that tracks live handles
#[derive(Debug, Default, Clone)]
pub struct RecordingScene {
    live: BTreeMap<VisualId, Visual>,
    next_id: u32,
    pub added: usize,
    pub removed: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn get(&self, id: VisualId) -> Option<&Visual> {
        self.live.get(&id)
    }

    /// Live zip lines (spoke-crossing guides)
    pub fn zip_lines(&self) -> usize {
        self.live
            .values()
            .filter(|v| matches!(v, Visual::ZipLine { .. }))
            .count()
    }
}

impl Scene for RecordingScene {
    fn add(&mut self, visual: Visual) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, visual);
        self.added += 1;
        id
    }

    fn update(&mut self, id: VisualId, visual: Visual) {
        if let Some(slot) = self.live.get_mut(&id) {
            *slot = visual;
        }
    }

    fn remove(&mut self, id: VisualId) {
        if self.live.remove(&id).is_some() {
            self.removed += 1;
        }
    }
}
