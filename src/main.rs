//! Outpost power simulator entry point: CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use outpost_power::config::ScenarioConfig;
use outpost_power::error::PersistError;
use outpost_power::io::export::export_csv;
use outpost_power::persist::SaveFile;
use outpost_power::scenario::build_engine;
use outpost_power::sim::kpi::KpiReport;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    steps_override: Option<usize>,
    warp_override: Option<f32>,
    telemetry_out: Option<String>,
    load_path: Option<String>,
    save_path: Option<String>,
    verbose: bool,
}

fn print_help() {
    eprintln!("outpost-power: range-based power balancing for deployable storage");
    eprintln!();
    eprintln!("Usage: outpost-power [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (outpost, twin, scatter)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --steps <usize>          Override number of steps");
    eprintln!("  --warp <f32>             Override time acceleration");
    eprintln!("  --telemetry-out <path>   Export step results to CSV");
    eprintln!("  --load <path>            Restore storage state from a save file");
    eprintln!("  --save <path>            Write storage state to a save file after the run");
    eprintln!("  --verbose                Log at debug level (RUST_LOG takes precedence)");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the outpost preset is used.");
}

/// Returns the value following a flag, or exits with a usage error.
fn flag_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires {what}");
        process::exit(1);
    }
    args[*i].clone()
}

/// Parses a flag value, or exits with a usage error naming the expected type.
fn parse_value<T: std::str::FromStr>(raw: &str, flag: &str, ty: &str) -> T {
    raw.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{raw}\" is not a valid {ty}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        steps_override: None,
        warp_override: None,
        telemetry_out: None,
        load_path: None,
        save_path: None,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                let path = flag_value(&args, &mut i, "--scenario", "a path argument");
                cli.scenario_path = Some(path);
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "--preset", "a name argument"));
            }
            "--seed" => {
                let raw = flag_value(&args, &mut i, "--seed", "a u64 argument");
                cli.seed_override = Some(parse_value(&raw, "--seed", "u64"));
            }
            "--steps" => {
                let raw = flag_value(&args, &mut i, "--steps", "a usize argument");
                cli.steps_override = Some(parse_value(&raw, "--steps", "usize"));
            }
            "--warp" => {
                let raw = flag_value(&args, &mut i, "--warp", "an f32 argument");
                cli.warp_override = Some(parse_value(&raw, "--warp", "f32"));
            }
            "--telemetry-out" => {
                let path = flag_value(&args, &mut i, "--telemetry-out", "a path argument");
                cli.telemetry_out = Some(path);
            }
            "--load" => {
                cli.load_path = Some(flag_value(&args, &mut i, "--load", "a path argument"));
            }
            "--save" => {
                cli.save_path = Some(flag_value(&args, &mut i, "--save", "a path argument"));
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the scenario from CLI flags: --scenario takes priority, then
/// --preset, then the outpost default.
fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        match (name.as_str(), cli.seed_override) {
            // The scatter layout itself is drawn from the seed
            ("scatter", Some(seed)) => Ok(ScenarioConfig::scatter(seed)),
            _ => ScenarioConfig::from_preset(name),
        }
    } else {
        Ok(ScenarioConfig::outpost())
    };

    match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = parse_args();
    init_tracing(cli.verbose);

    let mut scenario = load_scenario(&cli);

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(steps) = cli.steps_override {
        scenario.simulation.steps = steps;
    }
    if let Some(warp) = cli.warp_override {
        scenario.simulation.warp = warp;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build
    let mut engine = match build_engine(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if let Some(ref path) = cli.load_path {
        let restored = SaveFile::read(Path::new(path))
            .and_then(|save| engine.load(&save).map_err(PersistError::from));
        match restored {
            Ok(n) => info!(path = %path, nodes = n, "storage state restored"),
            Err(e) => {
                eprintln!("error: failed to load \"{path}\": {e}");
                process::exit(1);
            }
        }
    }

    // Run
    let results = engine.run();
    let kpi = KpiReport::from_results(&results);

    for r in &results {
        println!("{r}");
    }
    println!("\n{kpi}");

    // Per-node summary
    for entity in engine.world().iter() {
        let Some(node) = entity.storage.as_ref() else {
            continue;
        };
        match node.info() {
            Ok(text) => println!("\n[{}]\n{text}", entity.name),
            Err(e) => warn!(node = %entity.id, "{e}"),
        }
    }

    // Export CSV if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }

    // Persist storage state if requested
    if let Some(ref path) = cli.save_path {
        let written = engine
            .save()
            .map_err(PersistError::from)
            .and_then(|save| save.write(Path::new(path)));
        if let Err(e) = written {
            eprintln!("error: failed to write save file: {e}");
            process::exit(1);
        }
        eprintln!("Storage state written to {path}");
    }
}
