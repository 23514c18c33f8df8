//! The set of blueprints a generator may draw from.
//!
//! Pools are built in code, parsed from a JSON array of
//! [`BlueprintSpec`]s, or taken from [`TemplatePool::standard`]. The
//! generator only reads a pool; every placed room is an instance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::room::{BlueprintError, RoomBlueprint};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("room pool JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
}

/// Serialized form of one blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BlueprintSpec {
    /// Ground-filled room with centred doors.
    Rectangle { name: String, cols: usize, rows: usize },
    /// Hand-painted tiles, one string per row (see [`crate::tile::TileKind::from_glyph`]).
    Painted { name: String, layout: Vec<String> },
}

impl BlueprintSpec {
    pub fn build(&self) -> Result<RoomBlueprint, BlueprintError> {
        match self {
            BlueprintSpec::Rectangle { name, cols, rows } => {
                RoomBlueprint::rectangular(name.as_str(), *cols, *rows)
            }
            BlueprintSpec::Painted { name, layout } => RoomBlueprint::from_ascii(name.as_str(), layout.as_slice()),
        }
    }
}

/// Room sizes of the stock pool, `(cols, rows)`.
#[rustfmt::skip]
const STANDARD_SIZES: [(usize, usize); 35] = [
    (3, 5), (3, 3), (5, 5), (6, 3), (4, 7), (9, 9),
    (25, 20), (10, 14), (3, 4), (3, 6), (3, 10), (4, 9),
    (4, 15), (7, 18), (7, 8), (7, 9), (9, 19), (10, 15),
    (18, 18), (12, 12), (20, 20), (6, 6), (7, 7), (8, 8),
    (9, 9), (10, 10), (11, 11), (13, 13), (14, 14), (15, 15),
    (16, 16), (17, 17), (18, 18), (19, 19), (21, 21),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatePool {
    blueprints: Vec<RoomBlueprint>,
}

impl TemplatePool {
    pub fn new(blueprints: Vec<RoomBlueprint>) -> Self {
        Self { blueprints }
    }

    /// The stock mix of 35 rectangular rooms, from 3×3 closets up to a
    /// 25×20 hall.
    pub fn standard() -> Self {
        let blueprints = STANDARD_SIZES
            .iter()
            .filter_map(|&(cols, rows)| {
                RoomBlueprint::rectangular(format!("room {}x{}", cols, rows), cols, rows).ok()
            })
            .collect();
        Self { blueprints }
    }

    pub fn from_specs(specs: &[BlueprintSpec]) -> Result<Self, BlueprintError> {
        let blueprints = specs
            .iter()
            .map(BlueprintSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { blueprints })
    }

    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let specs: Vec<BlueprintSpec> = serde_json::from_str(json)?;
        Ok(Self::from_specs(&specs)?)
    }

    pub fn push(&mut self, blueprint: RoomBlueprint) {
        self.blueprints.push(blueprint);
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoomBlueprint> {
        self.blueprints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomBlueprint> + '_ {
        self.blueprints.iter()
    }

    /// Pool indices ordered by ascending area. Ties keep pool order.
    pub fn by_area(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.blueprints.len()).collect();
        order.sort_by_key(|&i| self.blueprints[i].area());
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pool_is_complete() {
        let pool = TemplatePool::standard();
        assert_eq!(pool.len(), 35);
        assert!(pool.iter().all(|bp| bp.cols() >= 3 && bp.rows() >= 3));
    }

    #[test]
    fn test_by_area_is_stable_ascending() {
        let pool = TemplatePool::new(vec![
            RoomBlueprint::rectangular("big", 9, 9).unwrap(),
            RoomBlueprint::rectangular("wide", 6, 3).unwrap(),
            RoomBlueprint::rectangular("tall", 3, 6).unwrap(),
            RoomBlueprint::rectangular("tiny", 3, 3).unwrap(),
        ]);
        assert_eq!(pool.by_area(), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_from_json_mixes_shapes() {
        let json = r###"[
            { "shape": "rectangle", "name": "hall", "cols": 7, "rows": 4 },
            { "shape": "painted", "name": "shrine", "layout": ["#+#", "+.+", "#+#"] }
        ]"###;
        let pool = TemplatePool::from_json(json).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).map(|bp| bp.area()), Some(28));
        assert_eq!(pool.get(1).map(|bp| bp.name()), Some("shrine"));
    }

    #[test]
    fn test_from_json_reports_bad_blueprint() {
        let json = r#"[{ "shape": "rectangle", "name": "sliver", "cols": 1, "rows": 9 }]"#;
        assert!(matches!(
            TemplatePool::from_json(json),
            Err(PoolError::Blueprint(BlueprintError::TooSmall { .. }))
        ));
        assert!(matches!(
            TemplatePool::from_json("{ not json"),
            Err(PoolError::Json(_))
        ));
    }
}
