//! Tile categories painted into room blueprints.
//!
//! Placement only cares about which cells a room owns, never about the
//! kind of tile in them. The display data here is carried along for
//! whoever draws the floor.

use serde::{Deserialize, Serialize};

/// Display colour for a tile kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Display attributes of a tile kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileStyle {
    pub name: &'static str,
    pub color: Rgb,
    /// Character used by ASCII dumps and blueprint layouts.
    pub glyph: char,
}

/// Bit values match the flags used by painted blueprint assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Empty = 1,
    Hole = 2,
    Ground = 4,
    Door = 8,
}

impl TileKind {
    pub fn all() -> [TileKind; 4] {
        [TileKind::Empty, TileKind::Hole, TileKind::Ground, TileKind::Door]
    }

    pub fn style(&self) -> TileStyle {
        match self {
            Self::Empty => TileStyle {
                name: "Empty",
                color: Rgb::new(0, 0, 0),
                glyph: ' ',
            },
            Self::Hole => TileStyle {
                name: "Hole",
                color: Rgb::new(40, 40, 48),
                glyph: '#',
            },
            Self::Ground => TileStyle {
                name: "Ground",
                color: Rgb::new(200, 200, 200),
                glyph: '.',
            },
            Self::Door => TileStyle {
                name: "Door",
                color: Rgb::new(0, 200, 0),
                glyph: '+',
            },
        }
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        *self as u8
    }

    pub fn glyph(&self) -> char {
        self.style().glyph
    }

    /// Inverse of [`TileKind::glyph`]. `_` is accepted for Empty so that
    /// layouts survive editors that trim trailing spaces.
    pub fn from_glyph(glyph: char) -> Option<TileKind> {
        match glyph {
            ' ' | '_' => Some(Self::Empty),
            '#' => Some(Self::Hole),
            '.' => Some(Self::Ground),
            '+' => Some(Self::Door),
            _ => None,
        }
    }

    /// Ground and doors can be walked on.
    pub fn is_walkable(&self) -> bool {
        matches!(self, Self::Ground | Self::Door)
    }
}
