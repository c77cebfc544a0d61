use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roomheat::{HeatingState, RoomConfig, RoomSimulation};

#[derive(Parser)]
#[command(name = "roomheat")]
#[command(about = "2D room heat conduction with thermostat-controlled heaters", long_about = None)]
struct Cli {
    /// JSON configuration file (partial overrides of the defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total simulated time
    #[arg(short, long)]
    time: Option<f64>,

    /// Nodes per axis
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Print only every N-th step
    #[arg(long, default_value_t = 1)]
    every: usize,

    /// Suppress the per-step report
    #[arg(short, long)]
    quiet: bool,

    /// Write the full result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RoomConfig::load(path)?,
        None => RoomConfig::new(),
    };
    if let Some(t) = cli.time {
        config.total_time = t;
    }
    if let Some(n) = cli.nodes {
        config.nodes = n;
    }

    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let mut sim = RoomSimulation::new(config)?;
    println!(
        "Grid {n}x{n}, h = {h:.5} m, dt = {dt:.6}, {steps} steps",
        n = sim.room().nodes,
        h = sim.room().spacing,
        dt = sim.dt(),
        steps = sim.total_steps()
    );

    let every = cli.every.max(1);
    let mut step = 0usize;
    sim.run_with(|sample, state, _field| {
        step += 1;
        if !cli.quiet && (step - 1) % every == 0 {
            println!(
                "t = {:8.4} | average temperature: {:6.2} °C | heaters: {:3} | total energy: {:10.2} J",
                sample.time,
                sample.average_temperature,
                if state == HeatingState::Heating { "ON" } else { "OFF" },
                sample.total_energy
            );
        }
        ControlFlow::Continue(())
    })?;

    let result = sim.finish()?;
    println!("{:-<60}", "");
    println!("Steps:               {}", result.steps);
    println!("Total energy:        {:.2} J", result.total_energy);
    println!(
        "Average temperature: {:.2} .. {:.2} °C",
        result.min_average_temperature, result.max_average_temperature
    );
    println!("Thermostat switches: {}", result.thermostat_switches);
    println!("Heating fraction:    {:.1} %", result.heating_fraction * 100.0);

    if let Some(path) = cli.output {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Result saved to {}", path.display());
    }

    Ok(())
}
