//! Audio collaborator
//!
//! The simulation only fires sound effects; synthesis lives behind `AudioSink`.
//! The sink is injected per tick instead of living in a global.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player fires
    PlayerShot,
    /// Enemy destroyed
    Explosion,
    /// Enemy takes a non-lethal hit
    EnemyHit,
    /// Aimed enemy shot
    EnemyLaser,
    /// Enemy lobs a bomb
    EnemyBomb,
    /// Bomb reaches the rim
    BombDetonation,
    /// Enemy slipped past the rim
    EnemyEscaped,
    /// Player loses a life
    PlayerHit,
    /// Level cleared
    LevelComplete,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Base gain for each effect before volume settings
    pub fn base_gain(&self) -> f32 {
        match self {
            SoundEffect::PlayerShot => 0.3,
            SoundEffect::EnemyHit | SoundEffect::EnemyLaser => 0.4,
            SoundEffect::EnemyBomb | SoundEffect::EnemyEscaped => 0.5,
            SoundEffect::Explosion => 0.7,
            SoundEffect::BombDetonation | SoundEffect::PlayerHit => 0.8,
            SoundEffect::LevelComplete | SoundEffect::GameOver => 1.0,
        }
    }
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Discards every effect
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Logs effects at debug level, scaled by the configured volume
#[derive(Debug, Clone)]
pub struct LogAudio {
    volume: f32,
}

impl LogAudio {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        let gain = effect.base_gain() * self.volume;
        if gain > 0.0 {
            log::debug!("sfx {:?} gain={:.2}", effect, gain);
        }
    }
}

/// Keeps every effect in order (tests, replays)
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
}

impl RecordingAudio {
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|e| **e == effect).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_counts() {
        let mut audio = RecordingAudio::default();
        audio.play(SoundEffect::Explosion);
        audio.play(SoundEffect::PlayerShot);
        audio.play(SoundEffect::Explosion);
        assert_eq!(audio.count(SoundEffect::Explosion), 2);
        assert_eq!(audio.count(SoundEffect::GameOver), 0);
    }
}
