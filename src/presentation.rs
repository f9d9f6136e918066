//! Presentation seams
//!
//! The simulation never touches textures or windows. Actors describe what to
//! draw with `SpriteDraw`, and check their sprite sheets exist through an
//! `AssetCatalog` when they are initialised.

use std::collections::HashMap;

use glam::Vec2;

/// One sprite blit request
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    /// Sprite sheet key (e.g. "player_run")
    pub asset_key: &'static str,
    /// Frame index inside the sheet
    pub frame: usize,
    /// Centre position in world pixels
    pub position: Vec2,
    /// Mirror horizontally (actor faces left)
    pub flip_x: bool,
}

/// Renderer supplied by the host
pub trait Presentation {
    fn draw_sprite(&mut self, sprite: &SpriteDraw);
}

/// Frame layout of a loaded sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetInfo {
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: usize,
}

/// Lookup of loaded sprite sheets
pub trait AssetCatalog {
    fn sheet(&self, key: &str) -> Option<SheetInfo>;
}

/// Catalog that claims every sheet exists with enough frames
///
/// Used when running without any assets (headless runs, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct AllAssets;

impl AssetCatalog for AllAssets {
    fn sheet(&self, _key: &str) -> Option<SheetInfo> {
        Some(SheetInfo {
            frame_width: 64,
            frame_height: 64,
            frame_count: usize::MAX,
        })
    }
}

/// Catalog backed by an explicit key → sheet table
#[derive(Debug, Default, Clone)]
pub struct KeyedCatalog {
    sheets: HashMap<String, SheetInfo>,
}

impl KeyedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, info: SheetInfo) {
        self.sheets.insert(key.into(), info);
    }

    pub fn remove(&mut self, key: &str) {
        self.sheets.remove(key);
    }
}

impl AssetCatalog for KeyedCatalog {
    fn sheet(&self, key: &str) -> Option<SheetInfo> {
        self.sheets.get(key).copied()
    }
}

/// Presentation that only counts what it was asked to draw
#[derive(Debug, Default)]
pub struct HeadlessPresentation {
    pub sprites_drawn: usize,
    pub last_frame: Vec<SpriteDraw>,
}

impl HeadlessPresentation {
    /// Forget the previous frame's draw list
    pub fn begin_frame(&mut self) {
        self.last_frame.clear();
    }
}

impl Presentation for HeadlessPresentation {
    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        self.sprites_drawn += 1;
        self.last_frame.push(sprite.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_catalog_lookup() {
        let mut catalog = KeyedCatalog::new();
        let info = SheetInfo {
            frame_width: 32,
            frame_height: 32,
            frame_count: 6,
        };
        catalog.insert("bat_fly", info);
        assert_eq!(catalog.sheet("bat_fly"), Some(info));
        catalog.remove("bat_fly");
        assert!(catalog.sheet("bat_fly").is_none());
    }

    #[test]
    fn test_headless_counts_draws() {
        let mut gfx = HeadlessPresentation::default();
        let sprite = SpriteDraw {
            asset_key: "player_idle",
            frame: 0,
            position: Vec2::ZERO,
            flip_x: false,
        };
        gfx.draw_sprite(&sprite);
        gfx.draw_sprite(&sprite);
        assert_eq!(gfx.sprites_drawn, 2);
        gfx.begin_frame();
        assert!(gfx.last_frame.is_empty());
    }
}
