//! Integration tests for production accounting under time acceleration.

mod common;

use outpost_power::config::ScenarioConfig;
use outpost_power::devices::ProductionOverride;

/// One solar panel, no demand, one empty unit; the sun sets at t = 10 s.
fn solar_scenario(warp: f32, production_override: ProductionOverride) -> ScenarioConfig {
    let mut cfg = common::hub_scenario(4, 0.0, vec![common::unit("bat", 3.0, 0.0)]);
    cfg.daylight = common::short_day();
    cfg.producers.push(common::panel("panel", 4.0, 20.0));
    cfg.simulation.warp = warp;
    cfg.simulation.production_override = production_override;
    cfg
}

fn production_per_step(cfg: &ScenarioConfig) -> Vec<f32> {
    common::engine_for(cfg)
        .run()
        .iter()
        .map(|r| r.production)
        .collect()
}

#[test]
fn real_time_follows_host_output() {
    // Steps end at t = 1, 2, 3, 4: all daylight
    let cfg = solar_scenario(1.0, ProductionOverride::Disabled);
    assert_eq!(production_per_step(&cfg), vec![20.0; 4]);
}

#[test]
fn accelerated_host_output_goes_stale_without_override() {
    // Steps end at t = 4, 8, 12, 16; the host stops refreshing above 1x
    let cfg = solar_scenario(4.0, ProductionOverride::Disabled);
    assert_eq!(production_per_step(&cfg), vec![20.0; 4]);
}

#[test]
fn accelerated_override_tracks_sunlight() {
    let cfg = solar_scenario(4.0, ProductionOverride::WhenAccelerated);
    assert_eq!(production_per_step(&cfg), vec![20.0, 20.0, 0.0, 0.0]);
}

#[test]
fn warp_scales_elapsed_time() {
    let cfg = solar_scenario(4.0, ProductionOverride::WhenAccelerated);
    let results = common::engine_for(&cfg).run();

    // 0.35 * 20 * 4 s per lit step, then nothing
    assert!((results[0].flow - 28.0).abs() < 1e-3);
    assert!((results[1].stored - 56.0).abs() < 1e-3);
    assert!((results[3].stored - 56.0).abs() < 1e-3);
}

#[test]
fn warp_change_mid_run_is_picked_up() {
    let cfg = solar_scenario(1.0, ProductionOverride::WhenAccelerated);
    let mut engine = common::engine_for(&cfg);
    let first = engine.step().unwrap_or_default();
    engine.set_warp(4.0);
    let second = engine.step().unwrap_or_default();

    assert_eq!(first[0].time_s, 1.0);
    assert_eq!(second[0].time_s, 5.0);
    assert!((second[0].flow - 28.0).abs() < 1e-3);
}
