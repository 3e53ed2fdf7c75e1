//! Meltdown Headless Simulation Harness
//!
//! Validates the reactor core without a renderer. Runs entirely
//! in-process — no windowing, no assets, no UI.
//!
//! Usage:
//!   cargo run -p meltdown-simtest
//!   cargo run -p meltdown-simtest -- --verbose

use meltdown_core::prelude::*;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn result(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Meltdown Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Rod lattice census
    results.extend(validate_lattice());

    // 2. Cold core stays cold
    results.extend(validate_cold_core());

    // 3. Startup source heats the core
    results.extend(validate_startup_source(verbose));

    // 4. Long soak under a bang-bang rod controller
    results.extend(soak_run(verbose));

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

// ── 1. Rod lattice ──────────────────────────────────────────────────────

fn validate_lattice() -> Vec<TestResult> {
    println!("--- Rod Lattice ---");
    let mut results = Vec::new();

    let core = match ReactorCore::seeded(CoreConfig::default(), 1) {
        Ok(c) => c,
        Err(e) => {
            results.push(result("core_construction", false, format!("{e}")));
            return results;
        }
    };
    let grid = core.grid();

    let fuel = grid.count_of_kind(RodKind::Fuel);
    let control = grid.count_of_kind(RodKind::Control);
    let empty = grid.count_of_kind(RodKind::Empty);

    results.push(result(
        "lattice_census",
        fuel == 28 && control == 9 && empty == 12,
        format!("{fuel} fuel / {control} control / {empty} empty"),
    ));

    // The empty corner cells fall outside the cylinder; every actual rod
    // must fit inside it.
    let all_inside = grid
        .rods()
        .iter()
        .filter(|r| r.kind != RodKind::Empty)
        .all(|r| r.x.hypot(r.z) + grid.radius() <= core.config().core_radius);
    results.push(result(
        "rods_inside_core",
        all_inside,
        "every fuel/control rod fits inside the core radius".into(),
    ));

    results
}

// ── 2. Cold core ────────────────────────────────────────────────────────

fn validate_cold_core() -> Vec<TestResult> {
    println!("--- Cold Core ---");
    let mut results = Vec::new();

    let mut core = ReactorCore::seeded(CoreConfig::default(), 2).expect("default config");
    for _ in 0..2_000 {
        core.tick();
    }

    let snap = core.snapshot();
    results.push(result(
        "cold_core_idle",
        snap.core_temp == core.config().ambient_temp
            && snap.neutron_count == 0
            && !snap.is_game_started,
        format!(
            "after 10 s idle: {:.1} °C, {} neutrons, started={}",
            snap.core_temp, snap.neutron_count, snap.is_game_started
        ),
    ));

    results
}

// ── 3. Startup source ───────────────────────────────────────────────────

fn validate_startup_source(verbose: bool) -> Vec<TestResult> {
    println!("--- Startup Source ---");
    let mut results = Vec::new();

    let mut core = ReactorCore::seeded(CoreConfig::default(), 3).expect("default config");
    core.set_startup_active(true);
    let mut peak_neutrons = 0usize;
    for _ in 0..2_000 {
        core.tick();
        peak_neutrons = peak_neutrons.max(core.neutron_count());
    }

    let temp = core.core_temp();
    results.push(result(
        "startup_source_heats_core",
        peak_neutrons > 0 && temp > core.config().ambient_temp,
        format!("peak {peak_neutrons} neutrons, {temp:.1} °C after 10 s"),
    ));

    if verbose {
        print_snapshot(&core);
    }

    results
}

// ── 4. Soak run ─────────────────────────────────────────────────────────

/// Two simulated minutes with the startup source held and a bang-bang
/// rod controller chasing a temperature band. Any game outcome is
/// acceptable; what must hold is every per-tick invariant.
fn soak_run(verbose: bool) -> Vec<TestResult> {
    println!("--- Soak Run ---");
    let mut results = Vec::new();

    let cfg = CoreConfig::default();
    let capacity = cfg.max_neutrons;
    let ambient = cfg.ambient_temp;
    let height = cfg.core_height;
    let demand_step = cfg.demand_change_rate / cfg.tick_rate;
    let ticks = (120.0 * cfg.tick_rate) as usize;

    let mut core = ReactorCore::seeded(cfg, 4).expect("default config");
    core.set_startup_active(true);

    let mut violations = Vec::new();
    let mut events = Vec::new();
    for tick in 0..ticks {
        // Withdraw rods to chase power, drop them when the core runs hot.
        let command = if core.core_temp() > 1900.0 {
            RodCommand::Lower
        } else if core.core_temp() < 1700.0 {
            RodCommand::Raise
        } else {
            RodCommand::Hold
        };
        core.set_rod_command(command);
        core.tick();
        events.extend(core.drain_events());

        let snap = core.snapshot();
        let ok = snap.neutron_count <= capacity
            && snap.core_temp >= ambient
            && snap.demanded_heat >= -demand_step - 1e-9
            && (0.0..=height).contains(&snap.control_rod_pos_y)
            && (!snap.is_nuke_exploded || snap.is_game_over)
            && (!snap.is_power_outage || snap.is_game_over)
            && (!snap.is_game_over || snap.is_game_started)
            && !(snap.is_nuke_exploded && snap.is_power_outage);
        if !ok {
            violations.push(tick);
        }
    }

    results.push(result(
        "soak_invariants",
        violations.is_empty(),
        if violations.is_empty() {
            format!(
                "{} ticks clean, outcome {:?}, {} events, {} dropped emissions",
                ticks,
                core.phase(),
                events.len(),
                core.dropped_neutrons()
            )
        } else {
            format!("{} invariant violations, first at tick {}", violations.len(), violations[0])
        },
    ));

    if verbose {
        for e in &events {
            println!("  event: {e:?}");
        }
        print_snapshot(&core);
    }

    results
}

fn print_snapshot(core: &ReactorCore) {
    match serde_json::to_string_pretty(&core.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("  snapshot serialization failed: {e}"),
    }
}
