//! Hotstall Headless Simulation Harness
//!
//! Drives the simulation core through its acceptance scenarios with no
//! rendering or audio attached. Runs entirely in-process — no assets, no
//! windowing, no timers beyond the simulated clock.
//!
//! Usage:
//!   cargo run -p hotstall-simtest
//!   cargo run -p hotstall-simtest -- --verbose
//!   cargo run -p hotstall-simtest -- --config tuning.json

use std::fs::File;
use std::process::ExitCode;

use hotstall_core::prelude::*;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let soak_config = match load_soak_config(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    println!("=== Hotstall Simulation Harness ===\n");

    let mut results = Vec::new();
    results.push(scenario_single_item_service());
    results.push(scenario_warning_then_angry());
    results.push(scenario_wrong_delivery_limit());
    results.push(scenario_difficulty_step());
    results.push(scenario_full_pool_backpressure());
    results.push(soak_pool_invariant(&soak_config));

    for result in &results {
        let marker = if result.passed { "PASS" } else { "FAIL" };
        if verbose || !result.passed {
            println!("[{}] {} — {}", marker, result.name, result.detail);
        } else {
            println!("[{}] {}", marker, result.name);
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    println!("{} passed, {} failed, {} total", passed, failed, results.len());

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Config for the soak run: `--config path.json` overrides the default
/// tuning. Scenario runs always pin their own knobs.
fn load_soak_config(args: &[String]) -> Result<SimConfig, String> {
    let path = match args.iter().position(|a| a == "--config") {
        Some(index) => match args.get(index + 1) {
            Some(path) => path.clone(),
            None => return Err("--config needs a file path".to_string()),
        },
        None => return Ok(SimConfig::default()),
    };

    let file = File::open(&path).map_err(|e| format!("cannot open {}: {}", path, e))?;
    let config: SimConfig =
        serde_json::from_reader(file).map_err(|e| format!("cannot parse {}: {}", path, e))?;
    config
        .validate()
        .map_err(|e| format!("invalid config {}: {}", path, e))?;
    Ok(config)
}

// ── Scenario tuning ─────────────────────────────────────────────────────

/// Deterministic knobs: no transit walks, single-item orders, a pinned
/// spawn clock.
fn scenario_config() -> SimConfig {
    SimConfig {
        counter_capacity: 1,
        min_spawn_interval: 1.0,
        max_spawn_interval: 1.0,
        base_wait_budget: 10.0,
        floor_wait_budget: 2.0,
        warning_fraction: 0.25,
        min_order_total: 1,
        max_order_total: 1,
        wrong_attempt_limit: 3,
        enter_duration: 0.0,
        exit_duration: 0.0,
        ..Default::default()
    }
}

fn scripted_engine(config: SimConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config).expect("scenario config must validate");
    engine.set_spawning(false);
    engine
}

fn needed_kind(engine: &SimulationEngine, id: CustomerId) -> Option<ItemKind> {
    engine
        .customer(id)?
        .order
        .iter()
        .find(|line| !line.is_complete())
        .map(|line| line.kind)
}

fn unwanted_kind(engine: &SimulationEngine, id: CustomerId) -> Option<ItemKind> {
    let snapshot = engine.customer(id)?;
    ItemKind::ALL
        .iter()
        .copied()
        .find(|kind| snapshot.order.iter().all(|line| line.kind != *kind))
}

// ── Scenarios ───────────────────────────────────────────────────────────

/// One customer, one item, delivered early: satisfied, counter freed.
fn scenario_single_item_service() -> TestResult {
    let name = "single item service";
    let mut engine = scripted_engine(scenario_config());

    let id = match engine.spawn_customer() {
        Some(id) => id,
        None => return TestResult::fail(name, "spawn refused with an empty pool".to_string()),
    };

    // Reach the counter, wait two seconds
    for _ in 0..4 {
        engine.update(0.5);
    }

    let kind = match needed_kind(&engine, id) {
        Some(kind) => kind,
        None => return TestResult::fail(name, "no open order line".to_string()),
    };
    let outcome = engine.deliver_item(id, kind);
    if !matches!(
        outcome,
        DeliveryResult::Accepted {
            order_complete: true,
            ..
        }
    ) {
        return TestResult::fail(name, format!("unexpected delivery result {:?}", outcome));
    }

    // Zero-length exit walk: the counter comes back within two ticks
    engine.update(0.5);
    engine.update(0.5);

    if engine.counters.available() != 1 || engine.stats.satisfied != 1 {
        return TestResult::fail(
            name,
            format!(
                "after exit: {} free counters, {} satisfied",
                engine.counters.available(),
                engine.stats.satisfied
            ),
        );
    }
    TestResult::pass(name, "satisfied at t=2s, counter released".to_string())
}

/// Unserved customer: Warning once 75% of the budget is gone, Angry at
/// the deadline.
fn scenario_warning_then_angry() -> TestResult {
    let name = "warning then angry";
    let mut engine = scripted_engine(scenario_config());

    let id = match engine.spawn_customer() {
        Some(id) => id,
        None => return TestResult::fail(name, "spawn refused".to_string()),
    };
    engine.update(0.5);

    let mut warned_at = None;
    for _ in 0..40 {
        engine.update(0.5);
        match engine.customer(id) {
            Some(snapshot) => {
                if snapshot.phase == Phase::Warning && warned_at.is_none() {
                    warned_at = Some(snapshot.wait_fraction);
                }
            }
            None => break,
        }
    }

    match warned_at {
        Some(fraction) if (0.75..0.8).contains(&fraction) => {}
        Some(fraction) => {
            return TestResult::fail(name, format!("warning at fraction {}", fraction))
        }
        None => return TestResult::fail(name, "never entered Warning".to_string()),
    }

    if engine.stats.angry != 1 || engine.stats.satisfied != 0 {
        return TestResult::fail(
            name,
            format!("{} angry, {} satisfied", engine.stats.angry, engine.stats.satisfied),
        );
    }
    TestResult::pass(name, "warning at 7.5s, angry at 10s".to_string())
}

/// Three deliveries the order never asked for: angry on the spot.
fn scenario_wrong_delivery_limit() -> TestResult {
    let name = "wrong delivery limit";
    let mut engine = scripted_engine(scenario_config());

    let id = match engine.spawn_customer() {
        Some(id) => id,
        None => return TestResult::fail(name, "spawn refused".to_string()),
    };
    engine.update(0.5);

    let wrong = match unwanted_kind(&engine, id) {
        Some(kind) => kind,
        None => return TestResult::fail(name, "no unwanted kind on a 1-item order".to_string()),
    };

    for attempt in 1..=3u32 {
        let result = engine.deliver_item(id, wrong);
        let expected_limit = attempt == 3;
        if !matches!(
            result,
            DeliveryResult::Rejected { wrong_attempts, limit_reached }
                if wrong_attempts == attempt && limit_reached == expected_limit
        ) {
            return TestResult::fail(name, format!("attempt {}: {:?}", attempt, result));
        }
    }

    match engine.customer(id) {
        Some(snapshot) if snapshot.phase == Phase::Angry && snapshot.wait_fraction < 0.5 => {
            TestResult::pass(name, "angry with most of the budget left".to_string())
        }
        Some(snapshot) => TestResult::fail(
            name,
            format!("phase {:?} at fraction {}", snapshot.phase, snapshot.wait_fraction),
        ),
        None => TestResult::fail(name, "customer vanished early".to_string()),
    }
}

/// Ten served customers at batch size 5: the next budget is 20 × 0.9²,
/// a step, not an interpolation.
fn scenario_difficulty_step() -> TestResult {
    let name = "difficulty step";
    let config = SimConfig {
        base_wait_budget: 20.0,
        floor_wait_budget: 8.0,
        decay_rate: 0.9,
        decay_batch: 5,
        ..scenario_config()
    };
    let mut engine = scripted_engine(config);
    engine.stats.served = 10;

    let id = match engine.spawn_customer() {
        Some(id) => id,
        None => return TestResult::fail(name, "spawn refused".to_string()),
    };
    engine.update(0.5);

    // Read the budget back through the wait clock: one second in is 1/16.2
    let fraction = match engine.customer(id) {
        Some(snapshot) => snapshot.wait_fraction,
        None => return TestResult::fail(name, "customer vanished".to_string()),
    };
    engine.update(1.0);
    let later = match engine.customer(id) {
        Some(snapshot) => snapshot.wait_fraction,
        None => return TestResult::fail(name, "customer vanished".to_string()),
    };

    let implied_budget = 1.0 / (later - fraction);
    if (implied_budget - 16.2).abs() > 0.05 {
        return TestResult::fail(name, format!("implied budget {}", implied_budget));
    }
    TestResult::pass(name, "11th customer budgeted 16.2s".to_string())
}

/// Two counters, both busy: admission refused until a departure frees
/// one, then the next spawn-clock tick succeeds.
fn scenario_full_pool_backpressure() -> TestResult {
    let name = "full pool backpressure";
    let config = SimConfig {
        counter_capacity: 2,
        ..scenario_config()
    };
    let mut engine = scripted_engine(config);

    let first = match engine.spawn_customer() {
        Some(id) => id,
        None => return TestResult::fail(name, "first spawn refused".to_string()),
    };
    if engine.spawn_customer().is_none() {
        return TestResult::fail(name, "second spawn refused".to_string());
    }
    if engine.spawn_customer().is_some() {
        return TestResult::fail(name, "third spawn admitted beyond capacity".to_string());
    }

    // Resume the spawn clock: intervals elapse but the pool stays full
    engine.set_spawning(true);
    for _ in 0..4 {
        engine.update(0.5);
    }
    if engine.active_customer_count() != 2 {
        return TestResult::fail(name, "spawned into a full pool".to_string());
    }

    engine.force_outcome(first, Outcome::Satisfied);
    for _ in 0..4 {
        engine.update(0.5);
    }

    if engine.active_customer_count() != 2 || engine.stats.served != 1 {
        return TestResult::fail(
            name,
            format!(
                "{} active, {} served",
                engine.active_customer_count(),
                engine.stats.served
            ),
        );
    }
    TestResult::pass(name, "freed counter refilled on the next interval".to_string())
}

/// Long randomized run: occupied counters must equal live customers at
/// every tick, and deliveries must never overfill a line.
fn soak_pool_invariant(base: &SimConfig) -> TestResult {
    let name = "soak: pool/population invariant";
    let config = SimConfig {
        base_wait_budget: 4.0,
        floor_wait_budget: 1.0,
        min_spawn_interval: 0.5,
        max_spawn_interval: 2.0,
        ..base.clone()
    };
    let mut engine = match SimulationEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => return TestResult::fail(name, format!("config rejected: {}", e)),
    };

    let mut served_ids = Vec::new();
    for tick in 0..2000u32 {
        engine.update(0.25);

        if engine.counters.occupied() != engine.active_customer_count() {
            return TestResult::fail(
                name,
                format!(
                    "tick {}: {} occupied vs {} live",
                    tick,
                    engine.counters.occupied(),
                    engine.active_customer_count()
                ),
            );
        }

        // Serve roughly every other customer as they appear
        for event in engine.drain_events() {
            if let SimEvent::Spawned { customer, .. } = event {
                if customer.0 % 2 == 0 {
                    served_ids.push(customer);
                }
            }
        }
        served_ids.retain(|&id| match needed_kind(&engine, id) {
            Some(kind) => !matches!(
                engine.deliver_item(id, kind),
                DeliveryResult::Accepted {
                    order_complete: true,
                    ..
                }
            ),
            None => false,
        });
    }

    if engine.stats.served == 0 {
        return TestResult::fail(name, "nobody was served in 500 simulated seconds".to_string());
    }
    TestResult::pass(
        name,
        format!(
            "{} served, {} satisfied, {} angry",
            engine.stats.served, engine.stats.satisfied, engine.stats.angry
        ),
    )
}
