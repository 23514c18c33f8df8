//! ProDungeon Headless Generation Harness
//!
//! Runs seeded floor generations and validates layout properties.
//! Runs entirely in-process: no engine, no rendering.
//!
//! Usage:
//!   cargo run -p produngeon-simtest
//!   cargo run -p produngeon-simtest -- --runs 200 --max-rooms 30 --verbose
//!   cargo run -p produngeon-simtest -- --pool my_rooms.json --render

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use produngeon_logic::config::{validate_config, ConfigError, GeneratorConfig};
use produngeon_logic::generator::{PlacementEngine, Termination};
use produngeon_logic::modificator::{Fixed, Modifiers};
use produngeon_logic::pool::TemplatePool;
use produngeon_logic::room::RoomBlueprint;
use produngeon_logic::validation::{validate_layout, Severity};

// ── Room pool (same JSON a game would ship) ─────────────────────────────
const POOL_JSON: &str = include_str!("../../../data/room_pool.json");

#[derive(Clone, Debug, Parser)]
#[command(name = "produngeon-simtest", about, version)]
struct Args {
    /// First seed of the sweep.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of seeded generations to run.
    #[arg(long, default_value_t = 50)]
    runs: u64,

    #[arg(long, default_value_t = 5)]
    min_rooms: u32,

    #[arg(long, default_value_t = 15)]
    max_rooms: u32,

    /// Largest shift the count signal may apply to the target.
    #[arg(long, default_value_t = 0.0)]
    variance: f32,

    /// Let a blueprint be placed more than once per floor.
    #[arg(long)]
    allow_repeats: bool,

    /// Room pool JSON file. Defaults to the bundled `data/room_pool.json`.
    #[arg(long, value_name = "FILE")]
    pool: Option<PathBuf>,

    /// Use the built-in rectangular room mix instead of a JSON pool.
    #[arg(long, conflicts_with = "pool")]
    standard: bool,

    /// Print every result, and log each placement.
    #[arg(long, short)]
    verbose: bool,

    /// Dump the first generated floor as ASCII.
    #[arg(long)]
    render: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    println!("=== ProDungeon Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Room pool loading
    let pool = load_pool(&args, &mut results);

    // 2. Configuration validation
    results.extend(validate_configuration(&args));

    if let Some(pool) = pool {
        // 3. Seed sweep
        results.extend(validate_seed_sweep(&args, &pool));

        // 4. Determinism
        results.extend(validate_determinism(&args, &pool));

        // 5. Size bias
        results.extend(validate_size_bias(&args, &pool));
    }

    // 6. Fixed scenarios
    results.extend(validate_scenarios());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use simplelog::LevelFilter::{Debug, Off, Warn};
    let level = if verbose { Debug } else { Warn };
    let result = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    if let Err(e) = result {
        eprintln!("logger setup failed: {}", e);
    }
}

fn base_config(args: &Args) -> GeneratorConfig {
    GeneratorConfig {
        variance: args.variance,
        allow_repeats: args.allow_repeats,
        ..GeneratorConfig::default().with_rooms(args.min_rooms, args.max_rooms)
    }
}

// ── 1. Room Pool ────────────────────────────────────────────────────────

fn load_pool(args: &Args, results: &mut Vec<TestResult>) -> Option<TemplatePool> {
    println!("--- Room Pool ---");

    let pool = if args.standard {
        TemplatePool::standard()
    } else {
        let (source, json) = match &args.pool {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(json) => (path.display().to_string(), json),
                Err(e) => {
                    results.push(TestResult {
                        name: "pool_read".into(),
                        passed: false,
                        detail: format!("cannot read {}: {}", path.display(), e),
                    });
                    return None;
                }
            },
            None => ("data/room_pool.json".to_string(), POOL_JSON.to_string()),
        };
        match TemplatePool::from_json(&json) {
            Ok(pool) => {
                log::info!("Loaded {} blueprints from {}", pool.len(), source);
                pool
            }
            Err(e) => {
                results.push(TestResult {
                    name: "pool_parse".into(),
                    passed: false,
                    detail: format!("{}: {}", source, e),
                });
                return None;
            }
        }
    };

    results.push(TestResult {
        name: "pool_not_empty".into(),
        passed: !pool.is_empty(),
        detail: format!("{} blueprints loaded", pool.len()),
    });

    let oversized: Vec<_> = pool
        .iter()
        .filter(|bp| bp.cols() > 200 || bp.rows() > 200)
        .map(|bp| bp.name().to_string())
        .collect();
    results.push(TestResult {
        name: "pool_fits_default_floor".into(),
        passed: oversized.is_empty(),
        detail: if oversized.is_empty() {
            "every blueprint fits a 200x200 floor".into()
        } else {
            format!("too large: {}", oversized.join(", "))
        },
    });

    if args.verbose {
        for index in pool.by_area() {
            if let Some(bp) = pool.get(index) {
                println!("    {:16} {:>2}x{:<2} area {}", bp.name(), bp.cols(), bp.rows(), bp.area());
            }
        }
    }

    Some(pool)
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn validate_configuration(args: &Args) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let errors = validate_config(&base_config(args));
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "{}..={} rooms, variance {}",
                args.min_rooms, args.max_rooms, args.variance
            )
        } else {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let inverted = GeneratorConfig::default().with_rooms(9, 3);
    let rejected = validate_config(&inverted)
        .contains(&ConfigError::RoomRangeInverted { min: 9, max: 3 });
    results.push(TestResult {
        name: "config_rejects_inverted_range".into(),
        passed: rejected,
        detail: "min_rooms > max_rooms is reported".into(),
    });

    results
}

// ── 3. Seed Sweep ───────────────────────────────────────────────────────

fn validate_seed_sweep(args: &Args, pool: &TemplatePool) -> Vec<TestResult> {
    println!("--- Seed Sweep ---");
    let mut results = Vec::new();

    let mut invalid = Vec::new();
    let mut over_cap = Vec::new();
    let mut bad_links = Vec::new();
    let mut too_many_steps = Vec::new();
    let mut terminations: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_rooms = 0usize;

    for seed in args.seed..args.seed + args.runs {
        let config = base_config(args).with_seed(seed);
        let mut engine = match PlacementEngine::seeded(pool.clone(), config, Modifiers::default()) {
            Ok(engine) => engine,
            Err(e) => {
                results.push(TestResult {
                    name: "sweep_initialize".into(),
                    passed: false,
                    detail: format!("seed {}: {}", seed, e),
                });
                return results;
            }
        };
        let report = match engine.run_to_completion() {
            Ok(report) => report,
            Err(e) => {
                invalid.push(format!("seed {}: {}", seed, e));
                continue;
            }
        };

        let layout = engine.layout();
        let errors: Vec<_> = validate_layout(layout)
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        if let Some(first) = errors.first() {
            invalid.push(format!("seed {}: {}", seed, first));
        }
        if report.rooms_placed > args.max_rooms as usize {
            over_cap.push(seed);
        }
        if !layout.is_empty() && layout.connections().len() + 1 != layout.len() {
            bad_links.push(seed);
        }
        if report.steps > args.max_rooms {
            too_many_steps.push(seed);
        }
        *terminations.entry(format!("{:?}", report.termination)).or_default() += 1;
        total_rooms += report.rooms_placed;

        if args.render && seed == args.seed {
            println!("  Floor for seed {} ({} rooms):", seed, layout.len());
            for line in layout.render_ascii().lines() {
                println!("    {}", line);
            }
        }
    }

    results.push(TestResult {
        name: "sweep_layouts_valid".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            format!("{} floors, no overlaps or broken links", args.runs)
        } else {
            format!("{} invalid, first: {}", invalid.len(), invalid[0])
        },
    });
    results.push(TestResult {
        name: "sweep_room_cap".into(),
        passed: over_cap.is_empty(),
        detail: format!("{} floors above max_rooms", over_cap.len()),
    });
    results.push(TestResult {
        name: "sweep_one_link_per_room".into(),
        passed: bad_links.is_empty(),
        detail: format!("{} floors with a link count other than rooms - 1", bad_links.len()),
    });
    results.push(TestResult {
        name: "sweep_step_bound".into(),
        passed: too_many_steps.is_empty(),
        detail: format!("{} sessions over max_rooms steps", too_many_steps.len()),
    });

    let mean = if args.runs > 0 {
        total_rooms as f64 / args.runs as f64
    } else {
        0.0
    };
    println!("  Mean rooms per floor: {:.1}", mean);
    if args.verbose {
        println!("  Termination reasons:");
        for (reason, count) in &terminations {
            println!("    {:14}: {}", reason, count);
        }
    }

    results
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(args: &Args, pool: &TemplatePool) -> Vec<TestResult> {
    println!("--- Determinism ---");

    let snapshot = || -> Option<String> {
        let config = base_config(args).with_seed(args.seed);
        let mut engine = PlacementEngine::seeded(pool.clone(), config, Modifiers::default()).ok()?;
        engine.run_to_completion().ok()?;
        serde_json::to_string(&engine.layout().snapshot()).ok()
    };
    let (a, b) = (snapshot(), snapshot());

    vec![TestResult {
        name: "same_seed_same_floor".into(),
        passed: a.is_some() && a == b,
        detail: format!("seed {} generated twice", args.seed),
    }]
}

// ── 5. Size Bias ────────────────────────────────────────────────────────

fn validate_size_bias(args: &Args, pool: &TemplatePool) -> Vec<TestResult> {
    println!("--- Size Bias ---");

    let mean_area = |size: f32| -> f64 {
        let mut area = 0usize;
        let mut rooms = 0usize;
        for seed in args.seed..args.seed + args.runs {
            let config = base_config(args).with_seed(seed);
            let modifiers = Modifiers::new(Fixed(size), Fixed(0.5), Fixed(0.5));
            let Ok(mut engine) = PlacementEngine::seeded(pool.clone(), config, modifiers) else {
                continue;
            };
            if engine.run_to_completion().is_err() {
                continue;
            }
            // the seed room is drawn without size bias
            for room in engine.layout().rooms().iter().skip(1) {
                area += room.area();
                rooms += 1;
            }
        }
        if rooms == 0 {
            0.0
        } else {
            area as f64 / rooms as f64
        }
    };
    let (small, large) = (mean_area(0.0), mean_area(1.0));
    println!("  Mean room area: size=0 → {:.1}, size=1 → {:.1}", small, large);

    vec![TestResult {
        name: "size_signal_orders_areas".into(),
        passed: pool.len() < 2 || small <= large,
        detail: format!("{:.1} <= {:.1}", small, large),
    }]
}

// ── 6. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios() -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    let cell = |n: usize| -> TemplatePool {
        TemplatePool::new(
            (0..n)
                .filter_map(|i| RoomBlueprint::rectangular(format!("cell {}", i), 3, 3).ok())
                .collect(),
        )
    };
    let run = |pool: TemplatePool, config: GeneratorConfig| -> Option<PlacementEngine> {
        let mut engine = PlacementEngine::seeded(pool, config, Modifiers::default()).ok()?;
        engine.run_to_completion().ok()?;
        Some(engine)
    };

    let single = run(cell(1), GeneratorConfig::default().with_rooms(1, 1));
    let centred = single.as_ref().is_some_and(|engine| {
        let layout = engine.layout();
        layout.len() == 1
            && layout.connections().is_empty()
            && layout.rooms()[0].anchor().map(|a| (a.col + 1, a.row + 1))
                == Some((layout.grid().midpoint().col, layout.grid().midpoint().row))
    });
    results.push(TestResult {
        name: "scenario_single_room_centred".into(),
        passed: centred,
        detail: "one 3x3 room on the floor midpoint, no links".into(),
    });

    let pair = run(cell(2), GeneratorConfig::default().with_rooms(2, 2));
    let adjacent = pair.as_ref().is_some_and(|engine| {
        let layout = engine.layout();
        let connections = layout.connections();
        let [link] = connections.as_slice() else {
            return false;
        };
        let from = layout.room(link.from).map(|r| r.door(link.from_side).global_position);
        let to = layout.room(link.to).map(|r| r.door(link.to_side).global_position);
        layout.len() == 2
            && matches!((from, to), (Some(Some(a)), Some(Some(b))) if a.step(link.from_side) == b)
    });
    results.push(TestResult {
        name: "scenario_pair_doors_adjacent".into(),
        passed: adjacent,
        detail: "two 3x3 rooms joined by one adjacent door pair".into(),
    });

    let huge = TemplatePool::new(
        RoomBlueprint::rectangular("hall", 30, 30)
            .ok()
            .into_iter()
            .collect(),
    );
    let config = GeneratorConfig {
        allow_repeats: true,
        ..GeneratorConfig::default().with_rooms(4, 4).with_grid(40, 40)
    };
    let crowded = run(huge, config);
    results.push(TestResult {
        name: "scenario_oversized_stops".into(),
        passed: crowded.as_ref().is_some_and(|engine| {
            engine.layout().len() <= 1 && engine.termination() == Some(Termination::NoFit)
        }),
        detail: "30x30 rooms on a 40x40 floor place at most one".into(),
    });

    results
}
