//! Consistency checks for generated floor layouts.
//!
//! Pure functions that take a [`Layout`] and return validation errors. A
//! layout produced by the placement engine should always come back clean;
//! these exist for tests, the simtest harness and hand-edited layouts.

use std::fmt;

use crate::layout::Layout;

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.category, self.message)
    }
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Footprints ───────────────────────────────────────────────────────

/// Check that no two placed rooms cover the same cell.
pub fn check_footprint_overlaps(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let footprints: Vec<_> = layout
        .rooms()
        .iter()
        .filter_map(|room| room.footprint().map(|fp| (room.id(), fp)))
        .collect();

    for (i, (a, fa)) in footprints.iter().enumerate() {
        for (b, fb) in &footprints[i + 1..] {
            if fa.intersects(fb) {
                errors.push(ValidationError {
                    category: "footprint",
                    severity: Severity::Error,
                    message: format!(
                        "Room {} at {} overlaps room {} at {}",
                        a, fa.origin, b, fb.origin
                    ),
                });
            }
        }
    }
    errors
}

/// Check that every cell inside a room's footprint is owned by that room.
pub fn check_grid_ownership(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for room in layout.rooms() {
        let Some(fp) = room.footprint() else {
            continue;
        };
        let foreign = (0..fp.rows as i32)
            .flat_map(|row| (0..fp.cols as i32).map(move |col| (col, row)))
            .filter(|&(col, row)| {
                let owner = layout
                    .grid()
                    .try_get(fp.origin.col + col, fp.origin.row + row)
                    .and_then(|(_, owner)| *owner);
                owner != Some(room.id())
            })
            .count();
        if foreign > 0 {
            errors.push(ValidationError {
                category: "ownership",
                severity: Severity::Error,
                message: format!(
                    "Room {} does not own {} of its {} footprint cells",
                    room.id(),
                    foreign,
                    room.area()
                ),
            });
        }
    }
    errors
}

// ── B. Doors ────────────────────────────────────────────────────────────

/// Check that placed doors sit at anchor + local position.
pub fn check_door_positions(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for room in layout.rooms() {
        for door in room.doors() {
            let expected = room.anchor().map(|anchor| anchor + door.local_position);
            if door.global_position != expected {
                errors.push(ValidationError {
                    category: "door_position",
                    severity: Severity::Error,
                    message: format!(
                        "Room {} {} door is at {:?}, expected {:?}",
                        room.id(),
                        door.orientation,
                        door.global_position,
                        expected
                    ),
                });
            }
        }
    }
    errors
}

/// Check that every matched door is answered by the opposite door of its
/// neighbour, and that matched doors face each other across one cell.
pub fn check_symmetric_links(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for room in layout.rooms() {
        for door in room.doors() {
            let Some(other_id) = door.neighbour else {
                continue;
            };
            let Some(other) = layout.room(other_id) else {
                errors.push(ValidationError {
                    category: "door_link",
                    severity: Severity::Error,
                    message: format!(
                        "Room {} {} door points at missing room {}",
                        room.id(),
                        door.orientation,
                        other_id
                    ),
                });
                continue;
            };

            let back = other.door(door.orientation.opposite());
            if back.neighbour != Some(room.id()) {
                errors.push(ValidationError {
                    category: "door_link",
                    severity: Severity::Error,
                    message: format!(
                        "Room {} {} door links to {}, but its {} door points at {:?}",
                        room.id(),
                        door.orientation,
                        other_id,
                        back.orientation,
                        back.neighbour
                    ),
                });
                continue;
            }

            let adjacent = door
                .global_position
                .map(|pos| pos.step(door.orientation));
            if adjacent.is_some() && adjacent != back.global_position {
                errors.push(ValidationError {
                    category: "door_link",
                    severity: Severity::Warning,
                    message: format!(
                        "Doors between {} and {} are not adjacent ({:?} / {:?})",
                        room.id(),
                        other_id,
                        door.global_position,
                        back.global_position
                    ),
                });
            }
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Check that every room is reachable from the seed room through doors.
pub fn check_connectivity(layout: &Layout) -> Vec<ValidationError> {
    if layout.is_connected() {
        return Vec::new();
    }
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Error,
        message: format!(
            "{} rooms placed but the door graph is not connected",
            layout.len()
        ),
    }]
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_layout(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_footprint_overlaps(layout));
    errors.extend(check_grid_ownership(layout));
    errors.extend(check_door_positions(layout));
    errors.extend(check_symmetric_links(layout));
    errors.extend(check_connectivity(layout));
    errors
}
