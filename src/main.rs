//! stormrunner - A deterministic, tick-driven weather simulation
//!
//! Headless runner: loads the TOML config, steps the atmosphere at 20 TPS and
//! optionally replays a command script and writes a JSONL event log.

mod command_script;
mod commands;
mod config;
mod headless;

use anyhow::{bail, Context, Result};
use config::SimulationConfig;
use std::{env, path::PathBuf};
use stormrunner_weather::WeatherCondition;
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = CliOptions::parse(env::args().skip(1))?;
    if cli.help {
        print!("{USAGE}");
        return Ok(());
    }

    info!("Starting stormrunner v{}", env!("CARGO_PKG_VERSION"));
    let sim = SimulationConfig::load(cli.config.as_deref())?;

    if cli.exit_when_script_finished && cli.command_script.is_none() {
        tracing::warn!("--exit-when-script-finished has no effect without --command-script");
    }

    let summary = headless::run(headless::HeadlessConfig {
        ticks: cli.ticks.unwrap_or(sim.ticks),
        seed: cli.seed.unwrap_or(sim.seed),
        weather: cli.weather,
        command_script: cli.command_script,
        event_log: cli.event_log,
        exit_when_script_finished: cli.exit_when_script_finished,
        audio: cli.audio,
        sim,
    })?;

    println!("{}", serde_json::to_string(&summary)?);
    info!("stormrunner shutting down");
    Ok(())
}

const USAGE: &str = "\
Usage: stormrunner [OPTIONS]

Options:
  --config <PATH>              TOML config (default: config/stormrunner.toml)
  --ticks <N>                  Ticks to simulate at 20 TPS
  --seed <N>                   Seed for every random stream
  --weather <CONDITION>        Transition toward CONDITION from the first tick
  --command-script <PATH>      JSON list of {tick, command} console steps
  --exit-when-script-finished  Stop once the command script is drained
  --event-log <PATH>           Write JSONL events to PATH
  --audio                      Open the audio output device
  -h, --help                   Print this help
";

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    help: bool,
    config: Option<PathBuf>,
    ticks: Option<u64>,
    seed: Option<u64>,
    weather: Option<WeatherCondition>,
    command_script: Option<PathBuf>,
    exit_when_script_finished: bool,
    event_log: Option<PathBuf>,
    audio: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--audio" => opts.audio = true,
                "--exit-when-script-finished" => opts.exit_when_script_finished = true,
                "--config" => opts.config = Some(next_path(&mut args, &arg)?),
                "--command-script" => opts.command_script = Some(next_path(&mut args, &arg)?),
                "--event-log" => opts.event_log = Some(next_path(&mut args, &arg)?),
                "--ticks" => opts.ticks = Some(next_parsed(&mut args, &arg, "an integer")?),
                "--seed" => opts.seed = Some(next_parsed(&mut args, &arg, "an integer")?),
                "--weather" => {
                    opts.weather = Some(next_parsed(&mut args, &arg, "a weather condition")?)
                }
                other => bail!("unknown argument: {other}\n\n{USAGE}"),
            }
        }

        Ok(opts)
    }
}

fn next_path<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<PathBuf> {
    match args.next() {
        Some(path) => Ok(PathBuf::from(path)),
        None => bail!("{flag} requires a path"),
    }
}

fn next_parsed<T, I>(args: &mut I, flag: &str, expected: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    I: Iterator<Item = String>,
{
    let Some(raw) = args.next() else {
        bail!("{flag} requires {expected}");
    };
    raw.parse::<T>()
        .map_err(|err| anyhow::anyhow!("{err}"))
        .with_context(|| format!("{flag} must be {expected}, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_every_flag() {
        let opts = parse(&[
            "--config",
            "a.toml",
            "--ticks",
            "40",
            "--seed",
            "7",
            "--weather",
            "heavy_rain",
            "--command-script",
            "s.json",
            "--exit-when-script-finished",
            "--event-log",
            "out/events.jsonl",
        ])
        .unwrap();
        assert_eq!(
            opts,
            CliOptions {
                help: false,
                config: Some(PathBuf::from("a.toml")),
                ticks: Some(40),
                seed: Some(7),
                weather: Some(WeatherCondition::HeavyRain),
                command_script: Some(PathBuf::from("s.json")),
                exit_when_script_finished: true,
                event_log: Some(PathBuf::from("out/events.jsonl")),
                audio: false,
            }
        );
    }

    #[test]
    fn bad_values_are_fatal() {
        let cases: [&[&str]; 5] = [
            &["--weather", "hail"],
            &["--ticks", "soon"],
            &["--seed"],
            &["--config"],
            &["--fast"],
        ];
        for args in cases {
            assert!(parse(args).is_err(), "{args:?} should be rejected");
        }
        let err = parse(&["--weather", "hail"]).unwrap_err();
        assert!(format!("{err:#}").contains("--weather must be a weather condition"));
    }
}
