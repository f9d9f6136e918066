//! Frame-based animation playback
//!
//! Animations drive gameplay here: attack damage windows are gated on frame
//! indices and most state transitions wait for a one-shot animation to finish.
//! `tick` reports completion as a return value instead of firing a callback.

use crate::error::InitError;
use crate::presentation::AssetCatalog;

/// Static description of one animation strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationDef {
    /// Sprite sheet key
    pub asset_key: &'static str,
    /// Number of frames in the strip
    pub frames: usize,
    /// Seconds each frame stays on screen
    pub frame_duration: f32,
    /// Wrap back to frame 0 instead of stopping on the last frame
    pub looping: bool,
}

impl AnimationDef {
    pub const fn new(
        asset_key: &'static str,
        frames: usize,
        frame_duration: f32,
        looping: bool,
    ) -> Self {
        Self {
            asset_key,
            frames,
            frame_duration,
            looping,
        }
    }

    /// Total playback time of one pass
    pub fn duration(&self) -> f32 {
        self.frames as f32 * self.frame_duration
    }

    /// Check the sheet this strip draws from is loaded and long enough
    pub fn verify(&self, assets: &dyn AssetCatalog) -> Result<(), InitError> {
        let sheet = assets.sheet(self.asset_key).ok_or_else(|| InitError::MissingAsset {
            key: self.asset_key.to_string(),
        })?;
        if sheet.frame_count < self.frames {
            return Err(InitError::FrameCountMismatch {
                key: self.asset_key.to_string(),
                expected: self.frames,
                available: sheet.frame_count,
            });
        }
        Ok(())
    }
}

/// Result of advancing an animation by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimTick {
    /// Still running
    Playing,
    /// A looping strip wrapped around
    Looped,
    /// A one-shot strip reached its last frame this step
    Completed,
    /// Nothing happened (already finished)
    Stopped,
}

/// Runtime playback state for one animation
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    def: AnimationDef,
    frame: usize,
    elapsed: f32,
    playing: bool,
}

impl AnimationPlayer {
    pub fn new(def: AnimationDef) -> Self {
        Self {
            def,
            frame: 0,
            elapsed: 0.0,
            playing: true,
        }
    }

    /// Switch to another strip, starting from its first frame
    pub fn play(&mut self, def: AnimationDef) {
        self.def = def;
        self.restart();
    }

    /// Rewind to frame 0 and resume
    pub fn restart(&mut self) {
        self.frame = 0;
        self.elapsed = 0.0;
        self.playing = true;
    }

    pub fn def(&self) -> &AnimationDef {
        &self.def
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once a one-shot strip has shown its last frame for its full duration
    pub fn is_complete(&self) -> bool {
        !self.playing && !self.def.looping
    }

    /// Advance playback by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> AnimTick {
        if !self.playing {
            return AnimTick::Stopped;
        }
        if self.def.frames == 0 || self.def.frame_duration <= 0.0 {
            self.playing = self.def.looping;
            return if self.def.looping {
                AnimTick::Playing
            } else {
                AnimTick::Completed
            };
        }

        self.elapsed += dt;
        let mut result = AnimTick::Playing;
        while self.elapsed >= self.def.frame_duration {
            self.elapsed -= self.def.frame_duration;
            self.frame += 1;
            if self.frame >= self.def.frames {
                if self.def.looping {
                    self.frame = 0;
                    result = AnimTick::Looped;
                } else {
                    self.frame = self.def.frames - 1;
                    self.elapsed = 0.0;
                    self.playing = false;
                    return AnimTick::Completed;
                }
            }
        }
        result
    }
}
