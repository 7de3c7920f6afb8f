//! AisleNav Headless Navigation Harness
//!
//! Replays navigation sessions against the pure logic crate.
//! Runs entirely in-process with no renderer and no wall clock.
//!
//! Usage:
//!   cargo run -p aislenav-simtest
//!   cargo run -p aislenav-simtest -- --verbose
//!   cargo run -p aislenav-simtest -- --json          # dump a sample route
//!   cargo run -p aislenav-simtest -- --seed 7        # frame jitter seed

use std::collections::HashSet;

use aislenav_logic::config::SimulatorConfig;
use aislenav_logic::drivers::Millis;
use aislenav_logic::geometry::Point;
use aislenav_logic::route::{
    synthesize_route, Direction, AUDIO_GUIDANCE_PREFIX, FLOOR_TRANSITION_POINT,
};
use aislenav_logic::scheduler::Scheduler;
use aislenav_logic::simulator::NavigationSimulator;
use aislenav_logic::store::StoreCatalog;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seed: u64,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        seed,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = parse_args();
    println!("=== AisleNav Navigation Harness ===\n");

    if opts.json {
        dump_sample_route();
    }

    let mut results = Vec::new();

    // 1. Store catalog sanity
    results.extend(validate_catalog(opts.verbose));

    // 2. Route synthesis sweep
    results.extend(validate_routes(opts.verbose));

    // 3. Session timing under jittered frames
    results.extend(validate_session_timing(opts.verbose, opts.seed));

    // 4. Completion join, both orderings
    results.extend(validate_completion_order(opts.verbose));

    // 5. Cancellation and stale callbacks
    results.extend(validate_cancellation(opts.verbose));

    // 6. Accessibility wording
    results.extend(validate_accessibility(opts.verbose));

    // 7. Configuration loading
    results.extend(validate_config(opts.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
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

#[derive(Serialize)]
struct RouteDump<'a> {
    from: Point,
    from_floor: i32,
    to: &'a str,
    route: aislenav_logic::route::Route,
}

fn dump_sample_route() {
    let catalog = StoreCatalog::sample();
    let Some(section) = catalog.find_by_name("Apparel") else {
        return;
    };
    let from = SimulatorConfig::default().default_location;
    let dump = RouteDump {
        from,
        from_floor: 1,
        to: &section.name,
        route: synthesize_route(from, 1, section, false),
    };
    match serde_json::to_string_pretty(&dump) {
        Ok(json) => println!("{}\n", json),
        Err(e) => log::error!("Route dump failed: {}", e),
    }
}

/// Run one session under a scheduler; returns (end time, simulator).
fn run_session(
    config: SimulatorConfig,
    section_id: &str,
    jitter_seed: Option<u64>,
) -> (Option<Millis>, NavigationSimulator) {
    let frame = config.frame_interval_ms;
    let mut sim = NavigationSimulator::new(config, StoreCatalog::sample());
    let mut sched = Scheduler::new(frame, 0);
    if let Some(seed) = jitter_seed {
        let mut rng = StdRng::seed_from_u64(seed);
        sched = sched.with_jitter(move || rng.gen_range(0..=20));
    }
    let Ok(session) = sim.start_by_id(section_id, 0) else {
        return (None, sim);
    };
    sched.attach(&sim, session);
    let ended = sched.run_to_completion(&mut sim, session, 10 * 60 * 1000);
    (ended, sim)
}

// ── 1. Store Catalog ────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Store Catalog ---");
    let mut results = Vec::new();
    let catalog = StoreCatalog::sample();

    let mut ids = HashSet::new();
    let dupes: Vec<_> = catalog
        .sections()
        .iter()
        .filter(|s| !ids.insert(s.id.as_str()))
        .collect();
    results.push(TestResult {
        name: "catalog_unique_ids".into(),
        passed: dupes.is_empty(),
        detail: format!(
            "{} sections, {} duplicate ids",
            catalog.sections().len(),
            dupes.len()
        ),
    });

    let out_of_plan: Vec<_> = catalog
        .sections()
        .iter()
        .filter(|s| {
            let r = s.rect;
            let far = Point::new(r.x + r.width, r.y + r.height);
            !(Point::new(r.x, r.y).in_plan() && far.in_plan())
        })
        .collect();
    results.push(TestResult {
        name: "catalog_rects_in_plan".into(),
        passed: out_of_plan.is_empty(),
        detail: if out_of_plan.is_empty() {
            "all section rectangles inside 0–100".into()
        } else {
            format!(
                "outside plan: {}",
                out_of_plan
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    });

    let no_aisles = catalog
        .sections()
        .iter()
        .filter(|s| s.aisles.is_empty())
        .count();
    results.push(TestResult {
        name: "catalog_aisles_present".into(),
        passed: no_aisles == 0,
        detail: format!("{} sections without aisle labels", no_aisles),
    });

    let quick = catalog.quick_destinations();
    results.push(TestResult {
        name: "catalog_quick_nav_resolves".into(),
        passed: quick.len() == aislenav_logic::store::QUICK_DESTINATIONS.len(),
        detail: format!("{} quick destinations resolved", quick.len()),
    });

    if verbose {
        println!("  Sections by floor:");
        for floor in catalog.available_floors() {
            let names: Vec<&str> = catalog
                .sections_on_floor(floor)
                .map(|s| s.name.as_str())
                .collect();
            println!("    floor {}: {}", floor, names.join(", "));
        }
    }

    results
}

// ── 2. Route Synthesis ──────────────────────────────────────────────────

fn validate_routes(_verbose: bool) -> Vec<TestResult> {
    println!("--- Route Synthesis ---");
    let mut results = Vec::new();
    let catalog = StoreCatalog::sample();
    let starts = [
        Point::new(50.0, 85.0),
        Point::new(5.0, 5.0),
        Point::new(95.0, 60.0),
    ];

    let mut endpoint_ok = true;
    let mut transition_ok = true;
    let mut heading_ok = true;
    let mut turn_ok = true;
    let mut combos = 0;

    for section in catalog.sections() {
        for &start in &starts {
            for floor in catalog.available_floors() {
                combos += 1;
                let route = synthesize_route(start, floor, section, false);

                endpoint_ok &= route.path.first() == Some(&start)
                    && route.path.last() == Some(&section.center());

                let hop_points = route
                    .path
                    .iter()
                    .skip(1)
                    .take(2)
                    .filter(|p| **p == FLOOR_TRANSITION_POINT)
                    .count();
                let hop_steps = route
                    .steps
                    .iter()
                    .filter(|s| s.id.starts_with("floor-transition"))
                    .count();
                if floor == section.floor {
                    transition_ok &= hop_steps == 0 && route.path.len() == 4;
                } else {
                    transition_ok &= hop_points == 2 && hop_steps == 2 && route.path.len() == 6;
                    let expected = if floor < section.floor {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                    heading_ok &= route.steps[1].direction == Some(expected);
                }

                let pivot = route.path[route.path.len() - 4];
                let expected_turn = if section.center().x > pivot.x {
                    Direction::Right
                } else {
                    Direction::Left
                };
                turn_ok &= route
                    .steps
                    .iter()
                    .find(|s| s.id == "2")
                    .is_some_and(|s| s.direction == Some(expected_turn));
            }
        }
    }

    results.push(TestResult {
        name: "route_endpoints".into(),
        passed: endpoint_ok,
        detail: format!("{} start/floor/section combos", combos),
    });
    results.push(TestResult {
        name: "route_floor_transitions".into(),
        passed: transition_ok,
        detail: "one elevator pair iff floors differ".into(),
    });
    results.push(TestResult {
        name: "route_heading_up_down".into(),
        passed: heading_ok,
        detail: "up iff destination floor is higher".into(),
    });
    results.push(TestResult {
        name: "route_turn_sign".into(),
        passed: turn_ok,
        detail: "right iff destination x is greater".into(),
    });

    results
}

// ── 3. Session Timing ───────────────────────────────────────────────────

fn validate_session_timing(verbose: bool, seed: u64) -> Vec<TestResult> {
    println!("--- Session Timing ---");
    let mut results = Vec::new();
    let catalog = StoreCatalog::sample();
    let config = SimulatorConfig::default();

    let mut all_ended = true;
    let mut all_exact = true;
    let mut longest: Millis = 0;

    for (i, section) in catalog.sections().iter().enumerate() {
        let (ended, sim) = run_session(config.clone(), &section.id, Some(seed + i as u64));
        let route = synthesize_route(
            config.default_location,
            config.default_floor,
            section,
            false,
        );
        let walk = (route.path.len() as Millis - 1) * config.segment_duration_ms;
        // The last step stays up for one full period before the ticker stops.
        let steps = route.steps.len() as Millis * config.step_period_ms;
        let expected_min = walk.max(steps);

        match ended {
            Some(t) => {
                longest = longest.max(t);
                // Steps tick on exact periods; frames may land up to one
                // jittered frame after the walk ends.
                let slack = config.frame_interval_ms + 20;
                all_exact &= t >= expected_min && t <= expected_min + slack;
                all_exact &= sim.completed_sessions() == 1 && !sim.state().is_navigating;
                if verbose {
                    println!(
                        "    {:18} ended at {:6} ms (walk {}, steps {})",
                        section.name, t, walk, steps
                    );
                }
            }
            None => all_ended = false,
        }
    }

    results.push(TestResult {
        name: "timing_all_sessions_end".into(),
        passed: all_ended,
        detail: format!(
            "{} sessions, longest {} ms",
            catalog.sections().len(),
            longest
        ),
    });
    results.push(TestResult {
        name: "timing_ends_on_slower_clock".into(),
        passed: all_exact,
        detail: "end = max(walk, steps) within one frame".into(),
    });

    // Final waypoint is exact even with irregular frames.
    let mut sim = NavigationSimulator::with_sample_store();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sched = Scheduler::new(16, 0).with_jitter(move || rng.gen_range(0..=30));
    let exact = match sim.start_by_id("2", 0) {
        Ok(session) => {
            sched.attach(&sim, session);
            sched.run_until(&mut sim, 6_100);
            sim.state().current_location == Point::new(52.5, 25.0)
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "timing_final_point_exact".into(),
        passed: exact,
        detail: "location == section center after (N-1) × segment".into(),
    });

    results
}

// ── 4. Completion Order ─────────────────────────────────────────────────

fn validate_completion_order(_verbose: bool) -> Vec<TestResult> {
    println!("--- Completion Order ---");
    let mut results = Vec::new();

    // Steps slower than the walk.
    let (slow_steps, sim_a) = run_session(SimulatorConfig::default(), "2", None);
    results.push(TestResult {
        name: "completion_position_first".into(),
        passed: slow_steps == Some(15_000) && sim_a.completed_sessions() == 1,
        detail: format!("ended at {:?}", slow_steps),
    });

    // Steps faster than the walk.
    let fast = SimulatorConfig {
        step_period_ms: 200,
        ..SimulatorConfig::default()
    };
    let (fast_steps, sim_b) = run_session(fast, "2", None);
    results.push(TestResult {
        name: "completion_steps_first".into(),
        passed: fast_steps == Some(6_000) && sim_b.completed_sessions() == 1,
        detail: format!("ended at {:?}", fast_steps),
    });

    // Both finishing on the same instant.
    let tied = SimulatorConfig {
        step_period_ms: 1_200,
        ..SimulatorConfig::default()
    };
    let (tied_end, sim_c) = run_session(tied, "2", None);
    results.push(TestResult {
        name: "completion_simultaneous".into(),
        passed: tied_end == Some(6_000) && sim_c.completed_sessions() == 1,
        detail: format!("ended at {:?}", tied_end),
    });

    results
}

// ── 5. Cancellation ─────────────────────────────────────────────────────

fn validate_cancellation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Cancellation ---");
    let mut results = Vec::new();

    // Explicit stop mid-route.
    let mut sim = NavigationSimulator::with_sample_store();
    let mut sched = Scheduler::new(16, 0);
    let frozen_ok = match sim.start_by_name("Books & Media", 0) {
        Ok(session) => {
            sched.attach(&sim, session);
            sched.run_until(&mut sim, 3_500);
            sim.stop();
            let frozen = sim.state().clone();
            sched.run_until(&mut sim, 60_000);
            sim.state() == &frozen && sched.discarded() > 0 && sched.pending() == 0
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "cancel_stop_freezes_state".into(),
        passed: frozen_ok,
        detail: format!("{} stale callbacks discarded", sched.discarded()),
    });

    // Floor switch is a stop trigger; floor is kept, location reset.
    let mut sim = NavigationSimulator::with_sample_store();
    let switched = match sim.start_by_id("16", 0) {
        Ok(_) => {
            sim.update(1_000);
            sim.switch_floor(2);
            !sim.state().is_navigating
                && sim.state().current_floor == 2
                && sim.state().current_location == sim.config().default_location
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "cancel_floor_switch".into(),
        passed: switched,
        detail: "switching floor stops navigation".into(),
    });

    // New destination replaces the running session.
    let mut sim = NavigationSimulator::with_sample_store();
    let mut sched = Scheduler::new(16, 0);
    let restarted = match (sim.start_by_id("1", 0), sim.start_by_id("3", 0)) {
        (Ok(first), Ok(second)) => {
            sched.attach(&sim, first);
            sched.attach(&sim, second);
            let ended = sched.run_to_completion(&mut sim, second, 60_000);
            ended == Some(15_000) && sim.completed_sessions() == 1
        }
        _ => false,
    };
    results.push(TestResult {
        name: "cancel_restart_single_session".into(),
        passed: restarted,
        detail: "old session callbacks never complete a second arrival".into(),
    });

    // Unknown destinations do nothing.
    let mut sim = NavigationSimulator::with_sample_store();
    let before = sim.state().clone();
    let refused = sim.start_by_id("does-not-exist", 0).is_err() && sim.state() == &before;
    results.push(TestResult {
        name: "cancel_unknown_section_noop".into(),
        passed: refused,
        detail: "lookup miss leaves state untouched".into(),
    });

    results
}

// ── 6. Accessibility ────────────────────────────────────────────────────

fn validate_accessibility(_verbose: bool) -> Vec<TestResult> {
    println!("--- Accessibility ---");
    let mut results = Vec::new();
    let catalog = StoreCatalog::sample();
    let start = SimulatorConfig::default().default_location;

    let mut prefixed = true;
    let mut same_fields = true;
    for section in catalog.sections() {
        let plain = synthesize_route(start, 1, section, false);
        let spoken = synthesize_route(start, 1, section, true);
        prefixed &= spoken
            .steps
            .iter()
            .all(|s| s.instruction.starts_with(AUDIO_GUIDANCE_PREFIX));
        same_fields &= plain.path == spoken.path
            && plain.steps.iter().zip(&spoken.steps).all(|(p, s)| {
                p.id == s.id
                    && p.location == s.location
                    && p.estimated_time == s.estimated_time
                    && p.distance == s.distance
                    && p.direction == s.direction
                    && p.floor == s.floor
            });
    }

    results.push(TestResult {
        name: "a11y_prefix_every_step".into(),
        passed: prefixed,
        detail: format!("instructions start with {:?}", AUDIO_GUIDANCE_PREFIX),
    });
    results.push(TestResult {
        name: "a11y_fields_unchanged".into(),
        passed: same_fields,
        detail: "direction/location/timing identical to plain route".into(),
    });

    results
}

// ── 7. Configuration ────────────────────────────────────────────────────

fn validate_config(_verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let parsed =
        SimulatorConfig::from_json(r#"{ "segment_duration_ms": 1000, "language": "French" }"#);
    results.push(TestResult {
        name: "config_partial_json".into(),
        passed: parsed
            .as_ref()
            .is_ok_and(|c| c.segment_duration_ms == 1000 && c.step_period_ms == 3000),
        detail: match &parsed {
            Ok(c) => format!(
                "segment={}ms step={}ms lang={}",
                c.segment_duration_ms,
                c.step_period_ms,
                c.language.name()
            ),
            Err(e) => e.to_string(),
        },
    });

    let rejected = SimulatorConfig::from_json(r#"{ "frame_interval_ms": 0 }"#);
    results.push(TestResult {
        name: "config_rejects_zero_frame".into(),
        passed: rejected.is_err(),
        detail: match rejected {
            Ok(_) => "accepted".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}
