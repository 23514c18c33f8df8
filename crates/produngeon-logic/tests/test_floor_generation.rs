//! Integration tests for whole generation sessions.
//!
//! Exercises: TemplatePool → PlacementEngine → Layout → validation
//!
//! All tests are pure logic, seeded, no rendering.

use std::collections::HashSet;

use produngeon_logic::config::GeneratorConfig;
use produngeon_logic::coord::GridPos;
use produngeon_logic::generator::{PlacementEngine, StepOutcome, Termination};
use produngeon_logic::modificator::{Counter, Fixed, Modificator, Modifiers, ShapePolarity};
use produngeon_logic::pool::TemplatePool;
use produngeon_logic::room::RoomBlueprint;
use produngeon_logic::validation::{validate_layout, Severity};

// ── Helpers ────────────────────────────────────────────────────────────

fn square_pool(n: usize, size: usize) -> TemplatePool {
    TemplatePool::new(
        (0..n)
            .map(|i| RoomBlueprint::rectangular(format!("square {}", i), size, size).unwrap())
            .collect(),
    )
}

fn run(pool: TemplatePool, config: GeneratorConfig) -> PlacementEngine {
    let mut engine = PlacementEngine::seeded(pool, config, Modifiers::default()).unwrap();
    engine.run_to_completion().unwrap();
    engine
}

fn assert_clean(engine: &PlacementEngine) {
    let errors: Vec<_> = validate_layout(engine.layout())
        .into_iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();
    assert!(errors.is_empty(), "{:?}", errors);
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn single_room_is_centred_with_no_connections() {
    let engine = run(square_pool(1, 3), GeneratorConfig::default().with_rooms(1, 1));
    let layout = engine.layout();

    assert_eq!(layout.len(), 1);
    assert!(layout.connections().is_empty());
    let room = &layout.rooms()[0];
    let anchor = room.anchor().unwrap();
    let centre = GridPos::new(anchor.col + 1, anchor.row + 1);
    assert_eq!(centre, layout.grid().midpoint());
    assert_eq!(room.available_doors().count(), 4);
}

#[test]
fn two_rooms_share_exactly_one_adjacent_door_pair() {
    let config = GeneratorConfig {
        variance: 0.0,
        ..GeneratorConfig::default().with_rooms(2, 2)
    };
    for seed in 0..20 {
        let engine = run(square_pool(2, 3), config.clone().with_seed(seed));
        let layout = engine.layout();
        assert_eq!(layout.len(), 2);

        let connections = layout.connections();
        assert_eq!(connections.len(), 1);
        let link = connections[0];

        let first = layout.room(link.from).unwrap().door(link.from_side);
        let second = layout.room(link.to).unwrap().door(link.to_side);
        let expected = first.global_position.map(|p| p.step(link.from_side));
        assert_eq!(second.global_position, expected, "seed {}", seed);
        assert_clean(&engine);
    }
}

#[test]
fn oversized_blueprints_never_place_a_second_room() {
    let config = GeneratorConfig {
        allow_repeats: true,
        ..GeneratorConfig::default().with_rooms(3, 3).with_grid(12, 12)
    };
    let engine = run(square_pool(2, 11), config.clone());
    assert!(engine.layout().len() <= 1);
    assert_eq!(engine.termination(), Some(Termination::NoFit));

    let engine = run(square_pool(2, 20), config);
    assert_eq!(engine.layout().len(), 0);
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn standard_pool_layouts_are_consistent() {
    for seed in 0..25 {
        let config = GeneratorConfig::default().with_rooms(6, 14).with_seed(seed);
        let engine = run(TemplatePool::standard(), config);
        assert_clean(&engine);

        // every room but the seed was joined through exactly one door at placement
        let links = engine.layout().connections().len();
        assert_eq!(links + 1, engine.layout().len().max(1), "seed {}", seed);
    }
}

#[test]
fn placing_steps_are_bounded_by_max_rooms() {
    for seed in 0..25 {
        let config = GeneratorConfig {
            allow_repeats: true,
            ..GeneratorConfig::default().with_rooms(2, 9).with_seed(seed)
        };
        let mut engine =
            PlacementEngine::seeded(square_pool(3, 5), config, Modifiers::default()).unwrap();
        let report = engine.run_to_completion().unwrap();
        assert!(report.rooms_placed <= 9);
        assert!(report.steps <= 9);
        assert_eq!(engine.step().unwrap(), StepOutcome::AlreadyComplete);
    }
}

#[test]
fn every_placed_room_joins_its_parent_through_one_door() {
    for seed in 0..20 {
        let config = GeneratorConfig {
            allow_repeats: true,
            ..GeneratorConfig::default().with_rooms(10, 14).with_seed(seed)
        };
        let mut engine =
            PlacementEngine::seeded(TemplatePool::standard(), config, Modifiers::default()).unwrap();

        loop {
            match engine.step().unwrap() {
                StepOutcome::Placed {
                    room,
                    attached_to: Some((parent, side)),
                } => {
                    let layout = engine.layout();
                    let placed = layout.room(room).unwrap();
                    let matched = placed.doors().iter().filter(|d| d.neighbour.is_some()).count();
                    assert_eq!(matched, 1, "seed {} room {}", seed, room);
                    assert_eq!(placed.door(side.opposite()).neighbour, Some(parent));
                    assert_eq!(layout.room(parent).unwrap().door(side).neighbour, Some(room));
                }
                StepOutcome::Placed { attached_to: None, .. } => {
                    assert_eq!(engine.layout().len(), 1);
                }
                StepOutcome::AlreadyComplete => break,
                StepOutcome::NoFit | StepOutcome::PoolExhausted => {}
            }
        }
    }
}

#[test]
fn shape_polarity_steers_the_first_attachment() {
    let vertical_attachments = |polarity: ShapePolarity| {
        (0..300u64)
            .filter(|&seed| {
                let config = GeneratorConfig {
                    allow_repeats: true,
                    shape_polarity: polarity,
                    ..GeneratorConfig::default().with_rooms(2, 2).with_seed(seed)
                };
                let modifiers = Modifiers::new(Fixed(0.5), Fixed(1.0), Fixed(0.5));
                let mut engine = PlacementEngine::seeded(square_pool(1, 3), config, modifiers).unwrap();
                engine.step().unwrap();
                match engine.step().unwrap() {
                    StepOutcome::Placed {
                        attached_to: Some((_, side)),
                        ..
                    } => side.is_vertical(),
                    other => panic!("seed {}: {:?}", seed, other),
                }
            })
            .count()
    };

    // a high signal doubles the favoured pair: about 200 of 300 either way
    assert!(vertical_attachments(ShapePolarity::VerticalWhenHigh) > 170);
    assert!(vertical_attachments(ShapePolarity::HorizontalWhenHigh) < 130);
}

#[test]
fn without_repeats_rooms_never_exceed_distinct_templates() {
    let config = GeneratorConfig::default().with_rooms(10, 10);
    let engine = run(square_pool(4, 3), config);
    let layout = engine.layout();
    assert_eq!(layout.len(), 4);
    assert_eq!(engine.termination(), Some(Termination::PoolExhausted));

    let templates: HashSet<_> = layout.rooms().iter().map(|r| r.template()).collect();
    assert_eq!(templates.len(), 4);
}

#[test]
fn same_seed_same_layout() {
    let config = GeneratorConfig {
        variance: 3.0,
        ..GeneratorConfig::default().with_rooms(5, 12).with_seed(99)
    };
    let a = run(TemplatePool::standard(), config.clone());
    let b = run(TemplatePool::standard(), config);
    assert_eq!(a.layout().rooms(), b.layout().rooms());
    assert_eq!(a.layout().render_ascii(), b.layout().render_ascii());
}

#[test]
fn modificator_can_drive_the_count() {
    let config = GeneratorConfig {
        variance: 3.0,
        allow_repeats: true,
        ..GeneratorConfig::default().with_rooms(5, 5)
    };
    let progress = Modificator::new("progress", 10.0).with_counter(Counter::new("cleared", 1.0));

    // nothing cleared yet: 5 + (0 * 2 - 1) * 3
    let modifiers = Modifiers::new(Fixed(0.5), Fixed(0.5), progress.clone());
    let engine = PlacementEngine::seeded(square_pool(1, 3), config.clone(), modifiers).unwrap();
    assert_eq!(engine.target(), 2);

    let mut halfway = progress;
    halfway.trigger("cleared", 5.0);
    let modifiers = Modifiers::new(Fixed(0.5), Fixed(0.5), halfway);
    let engine = PlacementEngine::seeded(square_pool(1, 3), config, modifiers).unwrap();
    assert_eq!(engine.target(), 5);
}

#[test]
fn painted_rooms_from_json_generate() {
    let json = r###"[
        { "shape": "painted", "name": "shrine", "layout": ["#+#", "+.+", "#+#"] },
        { "shape": "painted", "name": "ell", "layout": ["#+##", "+..#", "#..+", "##+#"] },
        { "shape": "rectangle", "name": "hall", "cols": 7, "rows": 4 }
    ]"###;
    let pool = TemplatePool::from_json(json).unwrap();
    let config = GeneratorConfig {
        allow_repeats: true,
        ..GeneratorConfig::default().with_rooms(8, 8).with_seed(5)
    };
    let engine = run(pool, config);
    assert_clean(&engine);
    assert!(!engine.layout().render_ascii().is_empty());
}
