//! HullSound Headless Propagation Harness
//!
//! Validates the propagation logic and the shipped sample data.
//! Runs entirely in-process with no audio backend or renderer.
//!
//! Usage:
//!   cargo run -p hullsound-simtest
//!   cargo run -p hullsound-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p hullsound-simtest

use std::collections::HashSet;

use hullsound_logic::config::validate_config;
use hullsound_logic::error::LoadError;
use hullsound_logic::solver::{find_shortest_paths, PathQuery};
use hullsound_logic::validation::{validate_structure, Severity};
use hullsound_logic::{
    ConnectivityGraph, Door, Opening, OpeningAxis, OpeningId, PropagationConfig, Rect, Room,
    RoomId, SoundPropagator, Structure, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Sample data (same JSON a game build ships) ──────────────────────────
const STRUCTURE_JSON: &str = include_str!("../../../data/demo_structure.json");
const CONFIG_JSON: &str = include_str!("../../../data/propagation.json");

// Demo hull rooms
const BOW: RoomId = RoomId(1);
const COMMAND: RoomId = RoomId(2);
const ENGINE: RoomId = RoomId(3);
const BALLAST: RoomId = RoomId(4);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== HullSound Propagation Harness ===\n");

    let mut results = Vec::new();

    // 1. Config file
    let config = validate_config_file(&mut results);

    // 2. Demo hull layout
    let structure = validate_demo_structure(&mut results);

    // 3. Propagation through the demo hull
    if let (Some(config), Some(structure)) = (&config, &structure) {
        results.extend(validate_demo_propagation(config, structure, verbose));
    }

    // 4. Random hull sweep
    results.extend(validate_random_hulls(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
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

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config_file(results: &mut Vec<TestResult>) -> Option<PropagationConfig> {
    println!("--- Propagation Config ---");

    let config = match PropagationConfig::from_json(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("{}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!(
            "door penalty {}, water penalty {}, {} paths",
            config.closed_door_penalty, config.water_surface_penalty, config.max_paths
        ),
    });

    // Shipped file should spell out the defaults
    results.push(TestResult {
        name: "config_matches_defaults".into(),
        passed: config == PropagationConfig::default(),
        detail: "propagation.json == PropagationConfig::default()".into(),
    });

    // Bad values are rejected with every problem listed
    let bad = PropagationConfig::from_json(r#"{ "max_paths": 0, "open_door_threshold": 2.0 }"#);
    let rejected = matches!(&bad, Err(LoadError::Invalid(errs)) if errs.len() == 2);
    results.push(TestResult {
        name: "config_rejects_invalid".into(),
        passed: rejected,
        detail: match bad {
            Err(e) => format!("{}", e),
            Ok(_) => "invalid config accepted".into(),
        },
    });

    let garbage = PropagationConfig::from_json("{ not json");
    results.push(TestResult {
        name: "config_rejects_malformed".into(),
        passed: matches!(garbage, Err(LoadError::Parse(_))),
        detail: "malformed JSON → parse error".into(),
    });

    results.push(TestResult {
        name: "config_validate_default".into(),
        passed: validate_config(&PropagationConfig::default()).is_empty(),
        detail: "default config has no validation errors".into(),
    });

    Some(config)
}

// ── 2. Demo structure ───────────────────────────────────────────────────

fn validate_demo_structure(results: &mut Vec<TestResult>) -> Option<Structure> {
    println!("--- Demo Structure ---");

    let structure = match Structure::from_json(STRUCTURE_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "structure_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "structure_parse".into(),
        passed: structure.rooms().len() == 5 && structure.openings().len() == 7,
        detail: format!(
            "{} rooms, {} openings",
            structure.rooms().len(),
            structure.openings().len()
        ),
    });

    let issues = validate_structure(&structure);
    let errors: Vec<_> = issues
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();
    results.push(TestResult {
        name: "structure_no_errors".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} warnings", issues.len())
        } else {
            errors
                .iter()
                .map(|e| format!("[{}] {}", e.category, e.message))
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let breaches = structure
        .openings()
        .iter()
        .filter(|o| o.is_hull_breach())
        .count();
    results.push(TestResult {
        name: "structure_has_breach".into(),
        passed: breaches == 1,
        detail: format!("{} hull breach(es)", breaches),
    });

    let flooded = structure.rooms().iter().filter(|r| r.water.is_some()).count();
    results.push(TestResult {
        name: "structure_has_water".into(),
        passed: flooded == 1,
        detail: format!("{} room(s) with water", flooded),
    });

    Some(structure)
}

// ── 3. Demo propagation ─────────────────────────────────────────────────

fn validate_demo_propagation(
    config: &PropagationConfig,
    structure: &Structure,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Demo Propagation ---");
    let mut results = Vec::new();
    let mut propagator = SoundPropagator::new(config.clone());

    let bow_pos = Vec2::new(-50.0, -20.0);
    let engine_pos = Vec2::new(450.0, -20.0);

    // Same room
    let same = propagator.propagate(structure, bow_pos, BOW, Vec2::new(50.0, -20.0), BOW, false);
    results.push(TestResult {
        name: "demo_same_room".into(),
        passed: same.len() == 1 && same[0].path.is_empty() && same[0].raw_distance == 100.0,
        detail: format!("{} result(s)", same.len()),
    });

    // Bow → engine room through the closed engine door; the runner-up leaves
    // through the breach and comes back in from the flooded exterior
    let to_engine = propagator.propagate(structure, bow_pos, BOW, engine_pos, ENGINE, false);
    let first = to_engine.first();
    results.push(TestResult {
        name: "demo_closed_door".into(),
        passed: to_engine.len() == 2
            && first.map_or(false, |r| {
                r.closed_doors == 1
                    && r.water_crossings == 0
                    && (r.raw_distance - 500.0).abs() < 0.01
                    && r.path == vec![OpeningId(1), OpeningId(2)]
            }),
        detail: match first {
            Some(r) => format!(
                "raw {:.1}, cost {:.1}, {} closed door(s)",
                r.raw_distance, r.approximate_cost, r.closed_doors
            ),
            None => "no route".into(),
        },
    });
    let runner_up = to_engine.get(1);
    results.push(TestResult {
        name: "demo_hull_breach".into(),
        passed: runner_up.map_or(false, |r| {
            r.terminal == Some(OpeningId(6)) && r.water_crossings == 1 && r.closed_doors == 1
        }),
        detail: match runner_up {
            Some(r) => format!("cost {:.1} via {:?}", r.approximate_cost, r.path),
            None => "no second route".into(),
        },
    });
    if verbose {
        for r in &to_engine {
            if let Ok(json) = serde_json::to_string(r) {
                println!("  bow → engine: {}", json);
            }
        }
    }

    // Reverse direction finds the same route length
    let back = propagator.propagate(structure, engine_pos, ENGINE, bow_pos, BOW, false);
    let symmetric = match (to_engine.first(), back.first()) {
        (Some(a), Some(b)) => {
            (a.raw_distance - b.raw_distance).abs() < 0.01
                && (a.approximate_cost - b.approximate_cost).abs() < 0.01
        }
        _ => false,
    };
    results.push(TestResult {
        name: "demo_symmetry".into(),
        passed: symmetric,
        detail: "bow ↔ engine routes match".into(),
    });

    // Bow → ballast tank crosses the water surface at the hatch
    let ballast_pos = Vec2::new(200.0, -100.0);
    let to_ballast = propagator.propagate(structure, bow_pos, BOW, ballast_pos, BALLAST, false);
    results.push(TestResult {
        name: "demo_water_crossing".into(),
        passed: to_ballast.len() == 1
            && to_ballast[0].water_crossings == 1
            && to_ballast[0].terminal == Some(OpeningId(3)),
        detail: format!(
            "{} route(s), {} crossing(s)",
            to_ballast.len(),
            to_ballast.first().map_or(0, |r| r.water_crossings)
        ),
    });

    // Duct blocks become passable when configured
    let mut ducts = SoundPropagator::new(PropagationConfig {
        traverse_duct_blocks: true,
        ..config.clone()
    });
    let via_ducts = ducts.propagate(structure, bow_pos, BOW, ballast_pos, BALLAST, false);
    results.push(TestResult {
        name: "demo_duct_blocks".into(),
        passed: via_ducts.len() == 2
            && via_ducts.iter().any(|r| r.terminal == Some(OpeningId(5))),
        detail: format!("{} route(s) with duct traversal", via_ducts.len()),
    });

    // A door's own sound is not muffled by that door
    let door_sound = propagator.propagate(
        structure,
        Vec2::new(290.0, -20.0),
        COMMAND,
        engine_pos,
        ENGINE,
        true,
    );
    results.push(TestResult {
        name: "demo_door_sound".into(),
        passed: door_sound.first().map_or(false, |r| r.terminal == Some(OpeningId(2)))
            && door_sound[0].closed_doors == 0
            && door_sound[0].approximate_cost < config.closed_door_penalty,
        detail: format!(
            "cost {:.1}",
            door_sound.first().map_or(f32::INFINITY, |r| r.approximate_cost)
        ),
    });

    // Sealed wall between ballast and engine never appears on a route
    let sealed_used = to_engine
        .iter()
        .chain(&to_ballast)
        .chain(&via_ducts)
        .any(|r| r.path.contains(&OpeningId(7)));
    results.push(TestResult {
        name: "demo_sealed_wall".into(),
        passed: !sealed_used,
        detail: "opening #7 (open 0.0) unused".into(),
    });

    // Range limit
    let query = PathQuery {
        source_pos: bow_pos,
        source_room: BOW,
        listener_pos: engine_pos,
        listener_room: ENGINE,
        max_paths: 3,
        max_raw_distance: 400.0,
        is_door_sound: false,
    };
    let best = propagator.best_path(structure, &query);
    results.push(TestResult {
        name: "demo_out_of_range".into(),
        passed: !best.found,
        detail: "500-unit route with 400-unit range → not found".into(),
    });

    // Cached graph tracks the structure generation
    let mut edited = structure.clone();
    let cached = propagator.graph().is_current_for(&edited);
    edited.mark_modified();
    let stale = !propagator.graph().is_current_for(&edited);
    results.push(TestResult {
        name: "demo_graph_cache".into(),
        passed: cached && stale,
        detail: format!(
            "{} nodes, {} edges",
            propagator.graph().len(),
            propagator.graph().edge_count()
        ),
    });

    results
}

// ── 4. Random hulls ─────────────────────────────────────────────────────

/// A `w`×`h` grid of 100-unit rooms. Walls between neighbours are doorways,
/// closed doors or sealed, at random; some rooms are flooded.
fn random_grid(w: u32, h: u32, rng: &mut StdRng) -> (Structure, HashSet<OpeningId>) {
    let mut s = Structure::new(7);
    let mut sealed = HashSet::new();
    let id = |x: u32, y: u32| y * w + x + 1;

    for y in 0..h {
        for x in 0..w {
            let mut room = Room::new(
                id(x, y),
                Rect::new(x as f32 * 100.0, y as f32 * 100.0, 100.0, 100.0),
            );
            if rng.gen_bool(0.15) {
                room.flood();
            }
            s.add_room(room);
        }
    }

    let mut next = 1;
    for y in 0..h {
        for x in 0..w {
            let (cx, cy) = (x as f32 * 100.0, y as f32 * 100.0);
            let mut walls = Vec::new();
            if x + 1 < w {
                walls.push((
                    Rect::new(cx + 50.0, cy, 2.0, 40.0),
                    OpeningAxis::Vertical,
                    id(x + 1, y),
                ));
            }
            if y + 1 < h {
                walls.push((
                    Rect::new(cx, cy + 50.0, 40.0, 2.0),
                    OpeningAxis::Horizontal,
                    id(x, y + 1),
                ));
            }
            for (rect, axis, other) in walls {
                let oid = OpeningId(next);
                next += 1;
                let roll: f32 = rng.gen();
                let (open, door) = if roll < 0.15 {
                    sealed.insert(oid);
                    (0.0, None)
                } else if roll < 0.4 {
                    (1.0, Some(Door::closed()))
                } else if roll < 0.55 {
                    (1.0, Some(Door::open()))
                } else {
                    (1.0, None)
                };
                s.add_opening(Opening {
                    id: oid,
                    rect,
                    axis,
                    open,
                    door,
                    rooms: [Some(RoomId(id(x, y))), Some(RoomId(other))],
                });
            }
        }
    }
    (s, sealed)
}

fn validate_random_hulls(verbose: bool) -> Vec<TestResult> {
    println!("--- Random Hull Sweep ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x5EA);
    let config = PropagationConfig::default();

    let mut queries = 0;
    let mut routes = 0;
    let mut unsorted = 0;
    let mut duplicate_terminals = 0;
    let mut over_range = 0;
    let mut through_sealed = 0;

    for _ in 0..40 {
        let (w, h) = (rng.gen_range(2..8), rng.gen_range(2..8));
        let (structure, sealed) = random_grid(w, h, &mut rng);
        let mut graph = ConnectivityGraph::new();

        for _ in 0..10 {
            let src = rng.gen_range(1..=w * h);
            let dst = rng.gen_range(1..=w * h);
            let center = |r: u32| {
                structure
                    .room(RoomId(r))
                    .map_or(Vec2::ZERO, |room| room.rect.center())
            };
            let query = PathQuery {
                source_pos: center(src) + Vec2::new(rng.gen_range(-40.0..40.0), 0.0),
                source_room: RoomId(src),
                listener_pos: center(dst) + Vec2::new(0.0, rng.gen_range(-40.0..40.0)),
                listener_room: RoomId(dst),
                max_paths: 3,
                max_raw_distance: 600.0,
                is_door_sound: false,
            };
            let found = find_shortest_paths(&mut graph, &structure, &config, &query);
            queries += 1;
            routes += found.len();

            if found
                .windows(2)
                .any(|p| p[0].approximate_cost > p[1].approximate_cost)
            {
                unsorted += 1;
            }
            let terminals: HashSet<_> = found.iter().filter_map(|r| r.terminal).collect();
            if terminals.len() != found.iter().filter(|r| r.terminal.is_some()).count() {
                duplicate_terminals += 1;
            }
            over_range += found.iter().filter(|r| r.raw_distance > 600.0).count();
            through_sealed += found
                .iter()
                .filter(|r| r.path.iter().any(|o| sealed.contains(o)))
                .count();
        }
    }

    if verbose {
        println!("  {} queries, {} routes found", queries, routes);
    }

    results.push(TestResult {
        name: "random_sorted_by_cost".into(),
        passed: unsorted == 0,
        detail: format!("{} of {} queries out of order", unsorted, queries),
    });
    results.push(TestResult {
        name: "random_unique_terminals".into(),
        passed: duplicate_terminals == 0,
        detail: format!("{} queries with repeated terminals", duplicate_terminals),
    });
    results.push(TestResult {
        name: "random_within_range".into(),
        passed: over_range == 0,
        detail: format!("{} routes beyond range", over_range),
    });
    results.push(TestResult {
        name: "random_no_sealed_walls".into(),
        passed: through_sealed == 0,
        detail: format!("{} routes through sealed walls", through_sealed),
    });

    results
}
