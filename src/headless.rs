use crate::command_script::CommandScriptPlayer;
use crate::commands::{execute_command, parse_command};
use crate::config::SimulationConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use stormrunner_audio::AudioManager;
use stormrunner_camera::CameraShake;
use stormrunner_core::{SimTick, TICK_SECONDS};
use stormrunner_scene::{Atmosphere, AtmosphereFrame};
use stormrunner_testkit::{EventRecord, JsonlSink};
use stormrunner_weather::WeatherCondition;
use tracing::{info, warn};

pub struct HeadlessConfig {
    pub sim: SimulationConfig,
    pub ticks: u64,
    pub seed: u64,
    pub weather: Option<WeatherCondition>,
    pub command_script: Option<PathBuf>,
    pub event_log: Option<PathBuf>,
    pub exit_when_script_finished: bool,
    pub audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub condition: WeatherCondition,
    pub condition_changes: u64,
    pub strikes: u64,
    pub commands: u64,
    /// Largest camera offset seen during the run.
    pub peak_shake: f32,
}

#[derive(Serialize)]
struct CommandEvent<'a> {
    command: &'a str,
    output: &'a [String],
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let mut atmosphere = Atmosphere::new(&cfg.sim.atmosphere, cfg.seed)?;
    if cfg.audio {
        atmosphere = atmosphere.with_audio(AudioManager::new()?);
    }
    let camera = Rc::new(RefCell::new(CameraShake::seeded(cfg.seed)));
    atmosphere.set_camera_shake_sink(Box::new(Rc::clone(&camera)));
    let mut script = cfg
        .command_script
        .as_deref()
        .map(CommandScriptPlayer::from_path)
        .transpose()?;
    let mut log = cfg
        .event_log
        .as_deref()
        .map(JsonlSink::create)
        .transpose()?;

    if let Some(condition) = cfg.weather {
        atmosphere.request_weather_change(condition)?;
    }

    let mut summary = RunSummary {
        ticks: 0,
        condition: atmosphere.current_condition(),
        condition_changes: 0,
        strikes: 0,
        commands: 0,
        peak_shake: 0.0,
    };

    while summary.ticks < cfg.ticks {
        let tick = atmosphere.tick();
        if let Some(script) = script.as_mut() {
            for command in script.drain_ready_commands(tick) {
                let output = match parse_command(&command) {
                    Ok(cmd) => execute_command(&mut atmosphere, cmd).lines,
                    Err(err) => {
                        warn!(%err, command = %command, "script command rejected");
                        vec![format!("Error: {err}")]
                    }
                };
                for line in &output {
                    info!(tick = tick.0, "{line}");
                }
                summary.commands += 1;
                if let Some(log) = log.as_mut() {
                    let event = CommandEvent {
                        command: &command,
                        output: &output,
                    };
                    log.write(&EventRecord::new(tick, "command", &event)?)?;
                }
            }
        }

        let frame = atmosphere.advance(TICK_SECONDS)?;
        let offset = camera.borrow_mut().advance(TICK_SECONDS);
        summary.peak_shake = summary.peak_shake.max(offset.length());
        summary.ticks += 1;
        summary.strikes += frame.strikes.len() as u64;
        if frame.changed.is_some() {
            summary.condition_changes += 1;
        }
        if let Some(log) = log.as_mut() {
            log_frame(log, &frame)?;
        }

        if cfg.exit_when_script_finished && script.as_ref().is_some_and(|s| s.is_finished()) {
            info!(tick = tick.0, "command script finished");
            break;
        }
    }

    summary.condition = atmosphere.current_condition();
    if let Some(log) = log {
        let written = log.written();
        log.into_inner().context("failed to flush event log")?;
        info!(written, "event log closed");
    }
    info!(
        ticks = summary.ticks,
        condition = %summary.condition,
        strikes = summary.strikes,
        "headless run finished"
    );
    Ok(summary)
}

fn log_frame(log: &mut JsonlSink, frame: &AtmosphereFrame) -> Result<()> {
    let tick: SimTick = frame.tick;
    for condition in &frame.cycle_requests {
        log.write(&EventRecord::new(tick, "cycle_request", condition)?)?;
    }
    if let Some(changed) = &frame.changed {
        log.write(&EventRecord::new(tick, "weather_changed", changed)?)?;
    }
    for strike in &frame.strikes {
        log.write(&EventRecord::new(tick, "lightning", strike)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "stormrunner-headless-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(ticks: u64) -> HeadlessConfig {
        HeadlessConfig {
            sim: SimulationConfig::default(),
            ticks,
            seed: 11,
            weather: None,
            command_script: None,
            event_log: None,
            exit_when_script_finished: false,
            audio: false,
        }
    }

    #[test]
    fn initial_weather_flag_settles_after_transition() {
        let summary = run(HeadlessConfig {
            weather: Some(WeatherCondition::Storm),
            ..config(100)
        })
        .unwrap();
        assert_eq!(summary.ticks, 100);
        assert_eq!(summary.condition, WeatherCondition::Storm);
        assert_eq!(summary.condition_changes, 1);
        assert_eq!(summary.peak_shake, 0.0);
    }

    #[test]
    fn scripted_run_writes_event_log() {
        let dir = temp_dir("script");
        let script = dir.join("script.json");
        fs::write(
            &script,
            r#"{"steps": [
                {"tick": 0, "command": "/weather storm"},
                {"tick": 150, "command": "/status"},
                {"tick": 160, "command": "/bogus"}
            ]}"#,
        )
        .unwrap();
        let log_path = dir.join("events.jsonl");

        let summary = run(HeadlessConfig {
            command_script: Some(script),
            event_log: Some(log_path.clone()),
            exit_when_script_finished: true,
            ..config(1000)
        })
        .unwrap();
        assert_eq!(summary.ticks, 161);
        assert_eq!(summary.commands, 3);
        assert_eq!(summary.condition, WeatherCondition::Storm);

        let contents = fs::read_to_string(&log_path).unwrap();
        let records: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let kinds: Vec<&str> = records.iter().filter_map(|r| r["kind"].as_str()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == "command").count(), 3);
        assert_eq!(kinds.iter().filter(|k| **k == "weather_changed").count(), 1);
        assert_eq!(
            kinds.iter().filter(|k| **k == "lightning").count() as u64,
            summary.strikes
        );
        let changed = records
            .iter()
            .find(|r| r["kind"] == "weather_changed")
            .unwrap();
        assert_eq!(changed["tick"], 99);
        assert_eq!(changed["payload"]["to"], "storm");
        if summary.strikes > 0 {
            assert!(summary.peak_shake > 0.0 && summary.peak_shake <= 0.5);
        }
    }

    #[test]
    fn missing_script_is_an_error() {
        let err = run(HeadlessConfig {
            command_script: Some(PathBuf::from("/nonexistent/script.json")),
            ..config(10)
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("command script"));
    }
}
