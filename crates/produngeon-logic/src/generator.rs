//! Greedy placement engine.
//!
//! A session draws a target room count, drops a seed room in the middle of
//! the floor and then grows the layout one room per [`PlacementEngine::step`]:
//! draw a blueprint biased by size, visit the frontier doors in a
//! shape-biased order, and attach the room at the first door where it
//! fits. Nothing is ever undone. When no door admits the drawn room the
//! session simply ends, possibly short of `min_rooms`.
//!
//! ```
//! use produngeon_logic::config::GeneratorConfig;
//! use produngeon_logic::generator::PlacementEngine;
//! use produngeon_logic::modificator::Modifiers;
//! use produngeon_logic::pool::TemplatePool;
//!
//! let config = GeneratorConfig::default().with_rooms(4, 8).with_seed(3);
//! let mut engine = PlacementEngine::seeded(TemplatePool::standard(), config, Modifiers::default())?;
//! let report = engine.run_to_completion()?;
//! assert!(report.rooms_placed <= 8);
//! # Ok::<(), produngeon_logic::generator::GenerationError>(())
//! ```

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;
use thiserror::Error;

use crate::config::{validate_config, ConfigError, GeneratorConfig};
use crate::coord::{Cardinal, GridPos};
use crate::layout::{Layout, LayoutError};
use crate::modificator::{clamp_unit, Modifiers};
use crate::pool::{PoolError, TemplatePool};
use crate::room::RoomId;
use crate::selection::{biased_shuffle, pick_weighted, uniform_between};

/// Largest weight cut applied to the blueprint farthest from the
/// preferred size.
const SIZE_FALLOFF: f32 = 0.95;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generator configuration: {}", join_errors(.0))]
    Config(Vec<ConfigError>),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("floor update failed: {0}")]
    Layout(#[from] LayoutError),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ConfigError>> for GenerationError {
    fn from(errors: Vec<ConfigError>) -> Self {
        GenerationError::Config(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationState {
    /// Nothing placed yet.
    Empty,
    Growing,
    /// Further steps are no-ops.
    Complete,
}

/// Result of one [`PlacementEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A room was committed. `attached_to` names the frontier door it was
    /// joined to, and is `None` for the seed room.
    Placed {
        room: RoomId,
        attached_to: Option<(RoomId, Cardinal)>,
    },
    /// The drawn blueprint fit nowhere; the session is over.
    NoFit,
    /// Nothing left to draw; the session is over.
    PoolExhausted,
    AlreadyComplete,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    TargetReached,
    NoFit,
    PoolExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub rooms_placed: usize,
    pub target: u32,
    pub termination: Termination,
    pub steps: u32,
}

/// One generation session: owns its pool, floor and random source.
#[derive(Debug)]
pub struct PlacementEngine<R = Xoshiro256PlusPlus> {
    pool: TemplatePool,
    /// Pool indices sorted by ascending area; position here is a blueprint's size rank.
    by_area: Vec<usize>,
    config: GeneratorConfig,
    modifiers: Modifiers,
    rng: R,
    layout: Layout,
    drawn: HashSet<usize>,
    target: u32,
    state: GenerationState,
    termination: Option<Termination>,
    steps: u32,
}

impl PlacementEngine<Xoshiro256PlusPlus> {
    /// Session with its own generator seeded from `config.seed`.
    pub fn seeded(
        pool: TemplatePool,
        config: GeneratorConfig,
        modifiers: Modifiers,
    ) -> Result<Self, GenerationError> {
        let rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        Self::initialize(pool, config, modifiers, rng)
    }

    /// [`PlacementEngine::seeded`] over a pool parsed from a JSON array of
    /// blueprint specs.
    pub fn seeded_from_json(
        pool_json: &str,
        config: GeneratorConfig,
        modifiers: Modifiers,
    ) -> Result<Self, GenerationError> {
        let pool = TemplatePool::from_json(pool_json)?;
        Self::seeded(pool, config, modifiers)
    }
}

impl<R: Rng> PlacementEngine<R> {
    pub fn initialize(
        pool: TemplatePool,
        config: GeneratorConfig,
        modifiers: Modifiers,
        rng: R,
    ) -> Result<Self, GenerationError> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let by_area = pool.by_area();
        let layout = Layout::new(config.grid_cols, config.grid_rows);
        let mut engine = Self {
            pool,
            by_area,
            config,
            modifiers,
            rng,
            layout,
            drawn: HashSet::new(),
            target: 0,
            state: GenerationState::Empty,
            termination: None,
            steps: 0,
        };
        engine.begin();
        Ok(engine)
    }

    /// Start over on an empty floor with the same pool. The random stream
    /// carries on, so the new session differs from the last one.
    pub fn reset(&mut self) {
        self.begin();
    }

    fn begin(&mut self) {
        self.layout = Layout::new(self.config.grid_cols, self.config.grid_rows);
        self.drawn.clear();
        self.steps = 0;
        self.termination = None;
        self.state = GenerationState::Empty;
        self.target = self.draw_target();

        log::info!(
            "Floor generation initialized: target {} rooms from {} templates on a {}x{} grid",
            self.target,
            self.pool.len(),
            self.config.grid_cols,
            self.config.grid_rows
        );

        if self.target == 0 {
            self.finish(Termination::TargetReached);
        }
    }

    /// `round(uniform(min, max) + (count * 2 - 1) * variance)`, kept
    /// within `[0, max_rooms]`.
    fn draw_target(&mut self) -> u32 {
        let min = self.config.min_rooms as f32;
        let max = self.config.max_rooms as f32;
        let base = uniform_between(min, max, &mut self.rng);
        let jitter = (clamp_unit(self.modifiers.count.normalized()) * 2.0 - 1.0) * self.config.variance;
        (base + jitter).round().clamp(0.0, max) as u32
    }

    /// Make one placement decision.
    pub fn step(&mut self) -> Result<StepOutcome, GenerationError> {
        if self.state == GenerationState::Complete {
            return Ok(StepOutcome::AlreadyComplete);
        }
        self.steps += 1;

        let outcome = if self.layout.is_empty() {
            self.place_seed()?
        } else {
            self.grow()?
        };

        match outcome {
            StepOutcome::Placed { .. } => {
                self.state = GenerationState::Growing;
                if self.layout.len() as u32 >= self.target {
                    self.finish(Termination::TargetReached);
                }
            }
            StepOutcome::NoFit => self.finish(Termination::NoFit),
            StepOutcome::PoolExhausted => self.finish(Termination::PoolExhausted),
            StepOutcome::AlreadyComplete => {}
        }
        Ok(outcome)
    }

    /// Step until the session ends.
    pub fn run_to_completion(&mut self) -> Result<GenerationReport, GenerationError> {
        loop {
            if let Some(termination) = self.termination {
                return Ok(GenerationReport {
                    rooms_placed: self.layout.len(),
                    target: self.target,
                    termination,
                    steps: self.steps,
                });
            }
            self.step()?;
        }
    }

    fn finish(&mut self, termination: Termination) {
        self.state = GenerationState::Complete;
        self.termination = Some(termination);

        let placed = self.layout.len();
        if (placed as u32) < self.config.min_rooms {
            log::warn!(
                "Floor generation ended early ({:?}): {} rooms placed, minimum is {}",
                termination,
                placed,
                self.config.min_rooms
            );
        }
        log::info!(
            "Floor generation complete ({:?}): {}/{} rooms in {} steps",
            termination,
            placed,
            self.target,
            self.steps
        );
    }

    /// Seed room, centred on the floor. Drawn uniformly.
    fn place_seed(&mut self) -> Result<StepOutcome, GenerationError> {
        let candidates = self.candidates();
        let Some(&(_, template)) = pick_weighted(&candidates, |_| 1.0, &mut self.rng) else {
            return Ok(StepOutcome::PoolExhausted);
        };
        self.mark_drawn(template);
        let Some(blueprint) = self.pool.get(template) else {
            return Ok(StepOutcome::PoolExhausted);
        };

        let anchor = GridPos::new(
            (self.config.grid_cols / 2) as i32 - (blueprint.cols() / 2) as i32,
            (self.config.grid_rows / 2) as i32 - (blueprint.rows() / 2) as i32,
        );
        if !self.layout.fits(blueprint.cols(), blueprint.rows(), anchor) {
            log::debug!(
                "Seed '{}' ({}x{}) does not fit the {}x{} floor",
                blueprint.name(),
                blueprint.cols(),
                blueprint.rows(),
                self.config.grid_cols,
                self.config.grid_rows
            );
            return Ok(StepOutcome::NoFit);
        }

        let room = blueprint.instantiate(self.layout.next_id(), template);
        let id = self.layout.insert(room, anchor, None)?;
        log::debug!("Seeded {} '{}' at {}", id, blueprint.name(), anchor);
        Ok(StepOutcome::Placed {
            room: id,
            attached_to: None,
        })
    }

    fn grow(&mut self) -> Result<StepOutcome, GenerationError> {
        let Some(template) = self.draw_sized() else {
            return Ok(StepOutcome::PoolExhausted);
        };
        let Some(blueprint) = self.pool.get(template) else {
            return Ok(StepOutcome::PoolExhausted);
        };

        let shape = self.modifiers.shape.normalized();
        let polarity = self.config.shape_polarity;
        let frontier = biased_shuffle(
            self.layout.frontier(),
            |door| polarity.door_weight(shape, door.orientation.is_vertical()),
            &mut self.rng,
        );
        let candidates = frontier.len();

        for door in frontier {
            let entry = blueprint.door(door.orientation.opposite());
            let anchor = door.position + door.orientation.offset() - entry.local_position;
            if !self.layout.fits(blueprint.cols(), blueprint.rows(), anchor) {
                continue;
            }

            let room = blueprint.instantiate(self.layout.next_id(), template);
            let id = self.layout.insert(room, anchor, Some(door))?;
            log::debug!(
                "Placed {} '{}' at {} through the {} door of {}",
                id,
                blueprint.name(),
                anchor,
                door.orientation,
                door.room
            );
            return Ok(StepOutcome::Placed {
                room: id,
                attached_to: Some((door.room, door.orientation)),
            });
        }

        log::debug!(
            "'{}' fits none of {} frontier doors",
            blueprint.name(),
            candidates
        );
        Ok(StepOutcome::NoFit)
    }

    /// Size-biased draw over the remaining blueprints.
    fn draw_sized(&mut self) -> Option<usize> {
        let candidates = self.candidates();
        if candidates.is_empty() {
            return None;
        }
        let last = self.by_area.len() - 1;
        let size = clamp_unit(self.modifiers.size.normalized());
        let mid = (last as f32 * size).round() as usize;
        let max_distance = mid.max(last - mid);

        let &(_, template) = pick_weighted(
            &candidates,
            |&(rank, _)| size_weight(rank, mid, max_distance),
            &mut self.rng,
        )?;
        self.mark_drawn(template);
        Some(template)
    }

    /// `(size rank, pool index)` of every blueprint still allowed.
    fn candidates(&self) -> Vec<(usize, usize)> {
        self.by_area
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, template)| self.config.allow_repeats || !self.drawn.contains(template))
            .collect()
    }

    fn mark_drawn(&mut self, template: usize) {
        if !self.config.allow_repeats {
            self.drawn.insert(template);
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn placed_count(&self) -> usize {
        self.layout.len()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn pool(&self) -> &TemplatePool {
        &self.pool
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

/// Weight of the blueprint at size rank `rank` when `mid` is preferred.
/// Falls linearly from 1 at `mid` to 0.05 at the farthest rank.
fn size_weight(rank: usize, mid: usize, max_distance: usize) -> f32 {
    if max_distance == 0 {
        return 1.0;
    }
    let distance = rank.abs_diff(mid) as f32;
    1.0 - SIZE_FALLOFF * distance / max_distance as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modificator::Fixed;
    use crate::room::RoomBlueprint;

    fn cells(n: usize) -> TemplatePool {
        TemplatePool::new(
            (0..n)
                .map(|i| RoomBlueprint::rectangular(format!("cell {}", i), 3, 3).unwrap())
                .collect(),
        )
    }

    fn engine(pool: TemplatePool, config: GeneratorConfig) -> PlacementEngine {
        PlacementEngine::seeded(pool, config, Modifiers::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GeneratorConfig::default().with_rooms(4, 2);
        let err = PlacementEngine::seeded(cells(1), config, Modifiers::default()).unwrap_err();
        assert!(matches!(err, GenerationError::Config(ref e) if e.len() == 1));
        assert!(err.to_string().contains("min_rooms (4)"));
    }

    #[test]
    fn test_zero_target_starts_complete() {
        let mut engine = engine(cells(3), GeneratorConfig::default().with_rooms(0, 0));
        assert_eq!(engine.state(), GenerationState::Complete);
        assert_eq!(engine.step().unwrap(), StepOutcome::AlreadyComplete);
        let report = engine.run_to_completion().unwrap();
        assert_eq!(report.rooms_placed, 0);
        assert_eq!(report.termination, Termination::TargetReached);
    }

    #[test]
    fn test_count_bias_shifts_target() {
        let config = GeneratorConfig {
            min_rooms: 4,
            max_rooms: 6,
            variance: 2.0,
            ..GeneratorConfig::default()
        };
        let low = PlacementEngine::seeded(
            cells(1),
            config.clone().with_rooms(4, 4),
            Modifiers::new(Fixed(0.5), Fixed(0.5), Fixed(0.0)),
        )
        .unwrap();
        assert_eq!(low.target(), 2);

        // pushed up past max_rooms, then clamped
        let high = PlacementEngine::seeded(
            cells(1),
            config.with_rooms(6, 6),
            Modifiers::new(Fixed(0.5), Fixed(0.5), Fixed(1.0)),
        )
        .unwrap();
        assert_eq!(high.target(), 6);
    }

    #[test]
    fn test_seed_is_centred() {
        let mut engine = engine(cells(1), GeneratorConfig::default().with_rooms(1, 1));
        assert_eq!(engine.state(), GenerationState::Empty);
        let outcome = engine.step().unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Placed {
                room: RoomId(0),
                attached_to: None
            }
        );
        assert_eq!(engine.layout().rooms()[0].anchor(), Some(GridPos::new(99, 99)));
        assert_eq!(engine.state(), GenerationState::Complete);
    }

    #[test]
    fn test_repeats_disallowed_exhausts_pool() {
        let mut engine = engine(cells(1), GeneratorConfig::default().with_rooms(3, 3));
        assert!(matches!(engine.step().unwrap(), StepOutcome::Placed { .. }));
        assert_eq!(engine.state(), GenerationState::Growing);
        assert_eq!(engine.step().unwrap(), StepOutcome::PoolExhausted);
        assert_eq!(engine.state(), GenerationState::Complete);
        assert_eq!(engine.placed_count(), 1);
    }

    #[test]
    fn test_repeats_allowed_reaches_target() {
        let config = GeneratorConfig {
            allow_repeats: true,
            ..GeneratorConfig::default().with_rooms(3, 3)
        };
        let report = engine(cells(1), config).run_to_completion().unwrap();
        assert_eq!(report.rooms_placed, 3);
        assert_eq!(report.steps, 3);
        assert_eq!(report.termination, Termination::TargetReached);
    }

    #[test]
    fn test_cramped_floor_ends_with_no_fit() {
        let config = GeneratorConfig {
            allow_repeats: true,
            ..GeneratorConfig::default().with_rooms(3, 3).with_grid(5, 5)
        };
        let report = engine(cells(1), config).run_to_completion().unwrap();
        assert_eq!(report.rooms_placed, 1);
        assert_eq!(report.termination, Termination::NoFit);
    }

    #[test]
    fn test_oversized_seed_is_no_fit() {
        let pool = TemplatePool::new(vec![RoomBlueprint::rectangular("hall", 20, 20).unwrap()]);
        let mut engine = engine(pool, GeneratorConfig::default().with_rooms(2, 2).with_grid(10, 10));
        assert_eq!(engine.step().unwrap(), StepOutcome::NoFit);
        assert!(engine.layout().is_empty());
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let mut engine = engine(TemplatePool::default(), GeneratorConfig::default());
        assert_eq!(engine.step().unwrap(), StepOutcome::PoolExhausted);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut engine = engine(cells(4), GeneratorConfig::default().with_rooms(3, 3));
        engine.run_to_completion().unwrap();
        engine.reset();
        assert_eq!(engine.state(), GenerationState::Empty);
        assert_eq!(engine.steps(), 0);
        assert!(engine.layout().is_empty());
        assert_eq!(engine.run_to_completion().unwrap().rooms_placed, 3);
    }

    /// Reads whatever it was built with, unclamped.
    struct Raw(f32);

    impl crate::modificator::Bias for Raw {
        fn normalized(&self) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_out_of_range_size_signal_is_clamped() {
        for reading in [1.5, -2.0, f32::NAN, f32::INFINITY] {
            let config = GeneratorConfig::default().with_rooms(4, 4);
            let modifiers = Modifiers::new(Raw(reading), Raw(reading), Raw(reading));
            let mut engine = PlacementEngine::seeded(TemplatePool::standard(), config, modifiers).unwrap();
            let report = engine.run_to_completion().unwrap();
            assert!(report.rooms_placed <= 4, "reading {}", reading);
        }
    }

    #[test]
    fn test_seeded_from_json() {
        let json = r###"[{ "shape": "rectangle", "name": "cell", "cols": 3, "rows": 3 }]"###;
        let mut engine =
            PlacementEngine::seeded_from_json(json, GeneratorConfig::default().with_rooms(1, 1), Modifiers::default())
                .unwrap();
        assert_eq!(engine.run_to_completion().unwrap().rooms_placed, 1);

        let err = PlacementEngine::seeded_from_json("[{", GeneratorConfig::default(), Modifiers::default())
            .unwrap_err();
        assert!(matches!(err, GenerationError::Pool(PoolError::Json(_))));
    }

    #[test]
    fn test_size_weight_falloff() {
        assert_eq!(size_weight(0, 0, 4), 1.0);
        assert!((size_weight(4, 0, 4) - 0.05).abs() < 1e-6);
        assert!((size_weight(1, 2, 2) - 0.525).abs() < 1e-6);
        assert_eq!(size_weight(0, 0, 0), 1.0);
    }

    #[test]
    fn test_size_bias_prefers_small_rooms() {
        let pool = TemplatePool::new(vec![
            RoomBlueprint::rectangular("huge", 15, 15).unwrap(),
            RoomBlueprint::rectangular("tiny", 3, 3).unwrap(),
        ]);
        let config = GeneratorConfig {
            allow_repeats: true,
            ..GeneratorConfig::default().with_rooms(2, 2)
        };
        let mut tiny = 0;
        for seed in 0..200 {
            let mut engine = PlacementEngine::seeded(
                pool.clone(),
                config.clone().with_seed(seed),
                Modifiers::new(Fixed(0.0), Fixed(0.5), Fixed(0.5)),
            )
            .unwrap();
            engine.run_to_completion().unwrap();
            if engine.layout().rooms().get(1).map(|r| r.template()) == Some(1) {
                tiny += 1;
            }
        }
        // weights are 1.0 vs 0.05
        assert!(tiny > 170, "{}", tiny);
    }
}
