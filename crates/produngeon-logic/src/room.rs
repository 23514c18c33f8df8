//! Room blueprints, placed room instances and their doors.
//!
//! A [`RoomBlueprint`] is authored once and never changes. Generation works
//! on [`Room`] instances obtained from [`RoomBlueprint::instantiate`]: each
//! one is a deep copy with its own [`RoomId`], unmatched doors and no
//! position until it is placed.
//!
//! Rooms never hold references to each other. A door names its parent and
//! its neighbour by id; the ids index the arena kept by
//! [`Layout`](crate::layout::Layout).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{Cardinal, GridPos};
use crate::grid::Grid;
use crate::tile::TileKind;

/// Stable identity of a placed room: its index in the layout's room list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rejected blueprint data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlueprintError {
    #[error("blueprint '{name}' has zero size ({cols}x{rows})")]
    EmptyFootprint {
        name: String,
        cols: usize,
        rows: usize,
    },
    #[error("blueprint '{name}' is {cols}x{rows}; a door on every side needs at least 3x3")]
    TooSmall {
        name: String,
        cols: usize,
        rows: usize,
    },
    #[error("blueprint '{name}' has no door on its {side} side")]
    MissingDoor { name: String, side: Cardinal },
    #[error("blueprint '{name}' row {row} is {found} cells wide, expected {expected}")]
    RaggedLayout {
        name: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("blueprint '{name}' uses unknown tile glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph {
        name: String,
        glyph: char,
        col: usize,
        row: usize,
    },
}

/// Where a blueprint door sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub orientation: Cardinal,
    pub local_position: GridPos,
}

/// A door of a room instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub parent: RoomId,
    pub orientation: Cardinal,
    /// Relative to the parent's top-left cell.
    pub local_position: GridPos,
    /// Floor position; `None` until the parent is placed.
    pub global_position: Option<GridPos>,
    /// Room on the other side, once matched.
    pub neighbour: Option<RoomId>,
}

impl Door {
    pub fn is_available(&self) -> bool {
        self.neighbour.is_none()
    }

    /// Match this door to `neighbour`. A door is matched at most once;
    /// returns `false` and leaves the door untouched if it already was.
    pub fn link(&mut self, neighbour: RoomId) -> bool {
        if self.neighbour.is_some() {
            return false;
        }
        self.neighbour = Some(neighbour);
        true
    }
}

/// Axis-aligned block of floor cells covered by a placed room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub origin: GridPos,
    pub cols: usize,
    pub rows: usize,
}

impl Footprint {
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.col >= self.origin.col
            && pos.row >= self.origin.row
            && pos.col < self.origin.col + self.cols as i32
            && pos.row < self.origin.row + self.rows as i32
    }

    /// Touching edges do not count.
    pub fn intersects(&self, other: &Footprint) -> bool {
        let (a0, b0) = (self.origin, other.origin);
        let a1 = GridPos::new(a0.col + self.cols as i32, a0.row + self.rows as i32);
        let b1 = GridPos::new(b0.col + other.cols as i32, b0.row + other.rows as i32);
        a0.col < b1.col && b0.col < a1.col && a0.row < b1.row && b0.row < a1.row
    }
}

/// Immutable room template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomBlueprint {
    name: String,
    tiles: Grid<TileKind>,
    /// Indexed by [`Cardinal::index`].
    doors: [DoorSpec; 4],
}

impl RoomBlueprint {
    /// Plain room: Ground everywhere, one Door tile centred on each side.
    pub fn rectangular(
        name: impl Into<String>,
        cols: usize,
        rows: usize,
    ) -> Result<Self, BlueprintError> {
        let name = name.into();
        if cols == 0 || rows == 0 {
            return Err(BlueprintError::EmptyFootprint { name, cols, rows });
        }
        if cols < 3 || rows < 3 {
            return Err(BlueprintError::TooSmall { name, cols, rows });
        }

        let (mid_col, mid_row) = ((cols / 2) as i32, (rows / 2) as i32);
        let (last_col, last_row) = (cols as i32 - 1, rows as i32 - 1);
        let tiles = Grid::from_fn(cols, rows, TileKind::Empty, |col, row| {
            let on_door = (row == 0 || row == last_row) && col == mid_col
                || (col == 0 || col == last_col) && row == mid_row;
            if on_door {
                TileKind::Door
            } else {
                TileKind::Ground
            }
        });
        Self::from_tiles(name, tiles)
    }

    /// Derive the doors from painted tiles: the first Door tile along each
    /// edge (left to right on rows, top to bottom on columns). Any further
    /// Door tiles on that edge stay plain tiles and never join rooms.
    pub fn from_tiles(name: impl Into<String>, tiles: Grid<TileKind>) -> Result<Self, BlueprintError> {
        let name = name.into();
        let (cols, rows) = (tiles.cols(), tiles.rows());
        if cols == 0 || rows == 0 {
            return Err(BlueprintError::EmptyFootprint { name, cols, rows });
        }
        if cols < 3 || rows < 3 {
            return Err(BlueprintError::TooSmall { name, cols, rows });
        }

        let is_door = |kind: &TileKind| *kind == TileKind::Door;
        let along_row = |row: usize| {
            tiles
                .row(row)
                .and_then(|cells| cells.iter().position(is_door))
                .map(|col| GridPos::new(col as i32, row as i32))
        };
        let along_col = |col: usize| {
            tiles
                .first_row_index(col, is_door)
                .map(|row| GridPos::new(col as i32, row as i32))
        };

        let mut doors = [DoorSpec {
            orientation: Cardinal::North,
            local_position: GridPos::ORIGIN,
        }; 4];
        for side in Cardinal::ALL {
            let found = match side {
                Cardinal::North => along_row(0),
                Cardinal::South => along_row(rows - 1),
                Cardinal::West => along_col(0),
                Cardinal::East => along_col(cols - 1),
            };
            let Some(local_position) = found else {
                return Err(BlueprintError::MissingDoor { name, side });
            };
            doors[side.index()] = DoorSpec {
                orientation: side,
                local_position,
            };
        }

        Ok(Self { name, tiles, doors })
    }

    /// Parse one string per row using the [`TileKind`] glyphs.
    pub fn from_ascii<S: AsRef<str>>(name: impl Into<String>, lines: &[S]) -> Result<Self, BlueprintError> {
        let name = name.into();
        let rows = lines.len();
        let cols = lines.first().map(|l| l.as_ref().chars().count()).unwrap_or(0);
        if cols == 0 || rows == 0 {
            return Err(BlueprintError::EmptyFootprint { name, cols, rows });
        }

        let mut tiles = Grid::new(cols, rows, TileKind::Empty);
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != cols {
                return Err(BlueprintError::RaggedLayout {
                    name,
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let Some(kind) = TileKind::from_glyph(glyph) else {
                    return Err(BlueprintError::UnknownGlyph {
                        name,
                        glyph,
                        col,
                        row,
                    });
                };
                if let Ok(cell) = tiles.get_mut(col as i32, row as i32) {
                    *cell = kind;
                }
            }
        }
        Self::from_tiles(name, tiles)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cols(&self) -> usize {
        self.tiles.cols()
    }

    pub fn rows(&self) -> usize {
        self.tiles.rows()
    }

    pub fn area(&self) -> usize {
        self.cols() * self.rows()
    }

    pub fn tiles(&self) -> &Grid<TileKind> {
        &self.tiles
    }

    pub fn door(&self, side: Cardinal) -> DoorSpec {
        self.doors[side.index()]
    }

    pub fn doors(&self) -> &[DoorSpec; 4] {
        &self.doors
    }

    /// Fresh instance of this blueprint with identity `id`. `template` is
    /// the blueprint's index in its pool, kept for reporting.
    pub fn instantiate(&self, id: RoomId, template: usize) -> Room {
        let doors = self.doors.map(|spec| Door {
            parent: id,
            orientation: spec.orientation,
            local_position: spec.local_position,
            global_position: None,
            neighbour: None,
        });
        Room {
            id,
            template,
            name: self.name.clone(),
            tiles: self.tiles.clone(),
            doors,
            anchor: None,
        }
    }
}

/// A blueprint instance owned by a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    template: usize,
    name: String,
    tiles: Grid<TileKind>,
    doors: [Door; 4],
    anchor: Option<GridPos>,
}

impl Room {
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn template(&self) -> usize {
        self.template
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cols(&self) -> usize {
        self.tiles.cols()
    }

    pub fn rows(&self) -> usize {
        self.tiles.rows()
    }

    pub fn area(&self) -> usize {
        self.cols() * self.rows()
    }

    pub fn tiles(&self) -> &Grid<TileKind> {
        &self.tiles
    }

    /// Top-left floor cell, once placed.
    pub fn anchor(&self) -> Option<GridPos> {
        self.anchor
    }

    pub fn door(&self, side: Cardinal) -> &Door {
        &self.doors[side.index()]
    }

    pub fn door_mut(&mut self, side: Cardinal) -> &mut Door {
        &mut self.doors[side.index()]
    }

    pub fn doors(&self) -> &[Door; 4] {
        &self.doors
    }

    /// Doors with no neighbour yet.
    pub fn available_doors(&self) -> impl Iterator<Item = &Door> + '_ {
        self.doors.iter().filter(|door| door.is_available())
    }

    /// Rooms reached through this room's matched doors.
    pub fn neighbours(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.doors.iter().filter_map(|door| door.neighbour)
    }

    /// Pin the room at `anchor` and resolve every door's floor position.
    pub fn place(&mut self, anchor: GridPos) {
        self.anchor = Some(anchor);
        for door in &mut self.doors {
            door.global_position = Some(anchor + door.local_position);
        }
    }

    pub fn footprint(&self) -> Option<Footprint> {
        self.anchor.map(|origin| Footprint {
            origin,
            cols: self.cols(),
            rows: self.rows(),
        })
    }
}
