//! The floor being built: shared grid, room arena and door graph.
//!
//! Rooms are stored in placement order and [`RoomId`] `n` is always the
//! `n`-th room. Every grid cell remembers which room, if any, owns it.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use thiserror::Error;

use crate::coord::{Cardinal, GridPos};
use crate::grid::{Grid, GridError};
use crate::room::{Footprint, Room, RoomId};
use crate::tile::TileKind;

/// Rejected [`Layout::insert`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("frontier names room {0}, which is not on the floor")]
    UnknownRoom(RoomId),
    #[error("the {side} door of room {room} is already matched")]
    DoorAlreadyMatched { room: RoomId, side: Cardinal },
}

/// One floor cell: what is painted there and who owns it.
pub type FloorCell = (TileKind, Option<RoomId>);

/// An unmatched door of a placed room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrontierDoor {
    pub room: RoomId,
    pub orientation: Cardinal,
    pub position: GridPos,
}

/// A matched door pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from: RoomId,
    pub from_side: Cardinal,
    pub to: RoomId,
    pub to_side: Cardinal,
}

#[derive(Debug, Clone)]
pub struct Layout {
    grid: Grid<FloorCell>,
    rooms: Vec<Room>,
}

impl Layout {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            grid: Grid::new(cols, rows, (TileKind::Empty, None)),
            rooms: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid<FloorCell> {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Id the next inserted room must carry.
    pub fn next_id(&self) -> RoomId {
        RoomId(self.rooms.len() as u32)
    }

    /// Every unmatched door, room by room in placement order.
    pub fn frontier(&self) -> Vec<FrontierDoor> {
        self.rooms
            .iter()
            .flat_map(|room| room.available_doors())
            .filter_map(|door| {
                door.global_position.map(|position| FrontierDoor {
                    room: door.parent,
                    orientation: door.orientation,
                    position,
                })
            })
            .collect()
    }

    /// Whether a `cols`×`rows` room anchored at `anchor` lies fully on the
    /// floor and covers only unowned cells. Off-floor footprints simply do
    /// not fit.
    pub fn fits(&self, cols: usize, rows: usize, anchor: GridPos) -> bool {
        match self.grid.extract_region(anchor.col, anchor.row, cols, rows) {
            Ok(region) => region.all(|_, _, (_, owner)| owner.is_none()),
            Err(_) => false,
        }
    }

    /// Place `room` at `anchor`, paint its tiles as owned by it, and when
    /// `attach` is given join that frontier door to the room's opposite
    /// door. The caller checks [`Layout::fits`] first.
    ///
    /// Nothing is changed on error. A door off the floor means the fit
    /// check was skipped; an already matched `attach` door means a stale
    /// frontier was used.
    pub fn insert(
        &mut self,
        mut room: Room,
        anchor: GridPos,
        attach: Option<FrontierDoor>,
    ) -> Result<RoomId, LayoutError> {
        let id = room.id();
        debug_assert_eq!(id, self.next_id(), "rooms must be inserted in id order");

        if let Some(frontier) = attach {
            let parent = self
                .rooms
                .get(frontier.room.index())
                .ok_or(LayoutError::UnknownRoom(frontier.room))?;
            if !parent.door(frontier.orientation).is_available() {
                return Err(LayoutError::DoorAlreadyMatched {
                    room: frontier.room,
                    side: frontier.orientation,
                });
            }
        }

        room.place(anchor);
        for door in room.doors() {
            if let Some(pos) = door.global_position {
                self.grid.get(pos.col, pos.row)?;
            }
        }

        let painted = room.tiles().map(|kind| (*kind, Some(id)));
        self.grid.write_region(&painted, anchor.col, anchor.row);

        if let Some(frontier) = attach {
            if let Some(parent) = self.rooms.get_mut(frontier.room.index()) {
                parent.door_mut(frontier.orientation).link(id);
            }
            room.door_mut(frontier.orientation.opposite()).link(frontier.room);
        }

        self.rooms.push(room);
        Ok(id)
    }

    /// Each matched door pair once, reported from the earlier-placed room.
    pub fn connections(&self) -> Vec<Connection> {
        let mut out = Vec::new();
        for room in &self.rooms {
            for door in room.doors() {
                let Some(other) = door.neighbour else {
                    continue;
                };
                if other <= room.id() {
                    continue;
                }
                out.push(Connection {
                    from: room.id(),
                    from_side: door.orientation,
                    to: other,
                    to_side: door.orientation.opposite(),
                });
            }
        }
        out
    }

    pub fn neighbours(&self, id: RoomId) -> Vec<RoomId> {
        self.room(id)
            .map(|room| room.neighbours().collect())
            .unwrap_or_default()
    }

    /// BFS over matched doors from the first room. An empty layout counts
    /// as connected.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.rooms.first() else {
            return true;
        };
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(first.id());
        queue.push_back(first.id());

        while let Some(current) = queue.pop_front() {
            for next in self.neighbours(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited.len() == self.rooms.len()
    }

    /// Smallest block covering every placed room.
    pub fn occupied_bounds(&self) -> Option<Footprint> {
        let mut footprints = self.rooms.iter().filter_map(Room::footprint);
        let first = footprints.next()?;
        let (mut min, mut max) = (
            first.origin,
            GridPos::new(
                first.origin.col + first.cols as i32,
                first.origin.row + first.rows as i32,
            ),
        );
        for fp in footprints {
            min.col = min.col.min(fp.origin.col);
            min.row = min.row.min(fp.origin.row);
            max.col = max.col.max(fp.origin.col + fp.cols as i32);
            max.row = max.row.max(fp.origin.row + fp.rows as i32);
        }
        Some(Footprint {
            origin: min,
            cols: (max.col - min.col) as usize,
            rows: (max.row - min.row) as usize,
        })
    }

    /// Text dump of the occupied part of the floor. Owned cells show their
    /// tile glyph, unowned cells a space.
    pub fn render_ascii(&self) -> String {
        let Some(bounds) = self.occupied_bounds() else {
            return String::new();
        };
        match self
            .grid
            .extract_region(bounds.origin.col, bounds.origin.row, bounds.cols, bounds.rows)
        {
            Ok(region) => region.render(|(kind, owner)| match owner {
                Some(_) => kind.glyph(),
                None => ' ',
            }),
            Err(_) => String::new(),
        }
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            rooms: self
                .rooms
                .iter()
                .map(|room| RoomSnapshot {
                    id: room.id(),
                    template: room.template(),
                    name: room.name().to_string(),
                    anchor: room.anchor(),
                    cols: room.cols(),
                    rows: room.rows(),
                    doors: room
                        .doors()
                        .iter()
                        .map(|door| DoorSnapshot {
                            orientation: door.orientation,
                            position: door.global_position,
                            neighbour: door.neighbour,
                        })
                        .collect(),
                })
                .collect(),
            connections: self.connections(),
        }
    }
}

/// Serializable summary of a layout for downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub rooms: Vec<RoomSnapshot>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub template: usize,
    pub name: String,
    pub anchor: Option<GridPos>,
    pub cols: usize,
    pub rows: usize,
    pub doors: Vec<DoorSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoorSnapshot {
    pub orientation: Cardinal,
    pub position: Option<GridPos>,
    pub neighbour: Option<RoomId>,
}
