//! Pure floor layout generation for ProDungeon.
//!
//! This crate grows a connected floor out of rectangular room blueprints.
//! It has no engine, renderer or file-format dependency: functions take
//! plain data and return results, so every step is unit-testable and a
//! seeded session is fully reproducible.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generator configuration, defaults and validation |
//! | [`coord`] | Cell coordinates and cardinal directions |
//! | [`generator`] | Greedy placement engine (seed, grow, stop) |
//! | [`grid`] | Dense 2D store with region and flood queries |
//! | [`layout`] | Floor grid, room arena and door graph |
//! | [`modificator`] | Normalized bias signals and event counters |
//! | [`pool`] | Blueprint pools, JSON loading, the stock room mix |
//! | [`room`] | Room blueprints, instances and doors |
//! | [`selection`] | Weighted random draws and biased shuffles |
//! | [`tile`] | Tile kinds and their display styles |
//! | [`validation`] | Layout consistency checks (overlap, links, connectivity) |

pub mod config;
pub mod coord;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod modificator;
pub mod pool;
pub mod room;
pub mod selection;
pub mod tile;
pub mod validation;

pub use config::GeneratorConfig;
pub use generator::{GenerationError, GenerationReport, PlacementEngine, StepOutcome};
pub use layout::Layout;
pub use pool::TemplatePool;
