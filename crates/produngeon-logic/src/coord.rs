//! Integer cell coordinates and cardinal directions.
//!
//! `col` grows east and `row` grows south, so a room's North side is its
//! first row.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A cell position on a grid, either room-local or floor-absolute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { col: 0, row: 0 };

    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Neighbouring cell one step in `dir`.
    pub fn step(self, dir: Cardinal) -> Self {
        self + dir.offset()
    }
}

impl Add for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.col + rhs.col, self.row + rhs.row)
    }
}

impl Sub for GridPos {
    type Output = GridPos;

    fn sub(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.col - rhs.col, self.row - rhs.row)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// The side of a room a door sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    /// Door order used everywhere a room's doors are listed.
    pub const ALL: [Cardinal; 4] = [
        Cardinal::North,
        Cardinal::South,
        Cardinal::East,
        Cardinal::West,
    ];

    pub const fn opposite(self) -> Cardinal {
        match self {
            Cardinal::North => Cardinal::South,
            Cardinal::South => Cardinal::North,
            Cardinal::East => Cardinal::West,
            Cardinal::West => Cardinal::East,
        }
    }

    pub const fn offset(self) -> GridPos {
        match self {
            Cardinal::North => GridPos::new(0, -1),
            Cardinal::South => GridPos::new(0, 1),
            Cardinal::East => GridPos::new(1, 0),
            Cardinal::West => GridPos::new(-1, 0),
        }
    }

    /// North and South doors lead vertically.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Cardinal::North | Cardinal::South)
    }

    /// Position in [`Cardinal::ALL`], used to index a room's door array.
    pub const fn index(self) -> usize {
        match self {
            Cardinal::North => 0,
            Cardinal::South => 1,
            Cardinal::East => 2,
            Cardinal::West => 3,
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cardinal::North => "north",
            Cardinal::South => "south",
            Cardinal::East => "east",
            Cardinal::West => "west",
        };
        f.write_str(name)
    }
}
