use std::fmt;

use stormrunner_core::{ClipId, ConfigError};
use stormrunner_scene::Atmosphere;
use stormrunner_weather::WeatherCondition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Weather { condition: WeatherCondition },
    MusicNext,
    MusicPrevious,
    MusicPlay { index: usize },
    Status,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

pub trait CommandContext {
    fn request_weather(&mut self, condition: WeatherCondition) -> Result<bool, ConfigError>;

    fn music_next(&mut self) -> Result<Option<ClipId>, ConfigError>;
    fn music_previous(&mut self) -> Result<Option<ClipId>, ConfigError>;
    fn music_play(&mut self, index: usize) -> Result<ClipId, ConfigError>;

    fn status_lines(&self) -> Vec<String>;
}

impl CommandContext for Atmosphere {
    fn request_weather(&mut self, condition: WeatherCondition) -> Result<bool, ConfigError> {
        self.request_weather_change(condition)
    }

    fn music_next(&mut self) -> Result<Option<ClipId>, ConfigError> {
        Ok(self.music_mut().next_track()?.cloned())
    }

    fn music_previous(&mut self) -> Result<Option<ClipId>, ConfigError> {
        Ok(self.music_mut().previous_track()?.cloned())
    }

    fn music_play(&mut self, index: usize) -> Result<ClipId, ConfigError> {
        self.music_mut().play_track(index).cloned()
    }

    fn status_lines(&self) -> Vec<String> {
        let machine = self.machine();
        let params = machine.current_parameters();
        let mut lines = vec![
            format!("tick {}", self.tick().0),
            format!(
                "weather {} -> {}{}",
                machine.current_condition(),
                machine.target_condition(),
                machine
                    .transition()
                    .map(|t| format!(" ({:.0}%)", t.progress() * 100.0))
                    .unwrap_or_default()
            ),
            format!(
                "rain {:.2} wind {:.2} lightning {:.2}",
                params.rain_intensity, params.wind_intensity, params.lightning_proneness
            ),
            format!(
                "lightning {:?}, {} strikes",
                machine.lightning().state(),
                machine.lightning().strikes()
            ),
            format!("light {:.2}", self.light().intensity()),
        ];
        lines.push(match self.ambience_clip() {
            Some(clip) => format!("ambience {clip}"),
            None => "ambience silent".to_string(),
        });
        lines.push(match self.music().current_track() {
            Some(track) => format!("music {track}"),
            None => "music stopped".to_string(),
        });
        lines
    }
}

pub fn execute_command(ctx: &mut impl CommandContext, cmd: ConsoleCommand) -> CommandOutput {
    let mut out = CommandOutput::default();
    match cmd {
        ConsoleCommand::Help => out.lines.extend(help_lines()),
        ConsoleCommand::Weather { condition } => match ctx.request_weather(condition) {
            Ok(true) => out.lines.push(format!("Weather changing to {condition}")),
            Ok(false) => out.lines.push(format!("Weather already {condition}")),
            Err(err) => out.lines.push(format!("Error: {err}")),
        },
        ConsoleCommand::MusicNext => push_track(&mut out, ctx.music_next()),
        ConsoleCommand::MusicPrevious => push_track(&mut out, ctx.music_previous()),
        ConsoleCommand::MusicPlay { index } => push_track(&mut out, ctx.music_play(index).map(Some)),
        ConsoleCommand::Status => out.lines.extend(ctx.status_lines()),
    }
    out
}

fn push_track(out: &mut CommandOutput, result: Result<Option<ClipId>, ConfigError>) {
    match result {
        Ok(Some(track)) => out.lines.push(format!("Music fading to {track}")),
        Ok(None) => out.lines.push("Playlist is empty".to_string()),
        Err(err) => out.lines.push(format!("Error: {err}")),
    }
}

pub fn parse_command(input: &str) -> Result<ConsoleCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    if input.is_empty() {
        return Ok(ConsoleCommand::Help);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "help" | "?" => Ok(ConsoleCommand::Help),
        "status" => Ok(ConsoleCommand::Status),
        "weather" => parse_weather_command(&args),
        "music" => parse_music_command(&args),
        _ => Err(CommandError::new(format!(
            "Unknown command: {cmd}. Try /help"
        ))),
    }
}

fn parse_weather_command(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    const USAGE: &str = "Usage: /weather <clear|light_rain|heavy_rain|storm>";
    let [name] = args else {
        return Err(CommandError::new(USAGE));
    };
    let condition = name
        .parse::<WeatherCondition>()
        .map_err(|err| CommandError::new(format!("{err}. {USAGE}")))?;
    Ok(ConsoleCommand::Weather { condition })
}

fn parse_music_command(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    const USAGE: &str = "Usage: /music <next|prev|play N>";
    let sub = args.first().map(|s| s.to_ascii_lowercase());
    match (sub.as_deref(), &args[args.len().min(1)..]) {
        (Some("next"), []) => Ok(ConsoleCommand::MusicNext),
        (Some("prev" | "previous"), []) => Ok(ConsoleCommand::MusicPrevious),
        (Some("play"), [raw]) => {
            let index = raw
                .parse::<usize>()
                .map_err(|_| CommandError::new(format!("Invalid track index: {raw}")))?;
            Ok(ConsoleCommand::MusicPlay { index })
        }
        _ => Err(CommandError::new(USAGE)),
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  /help".to_string(),
        "  /weather <clear|light_rain|heavy_rain|storm>".to_string(),
        "  /music <next|prev|play N>   (tracks are numbered from 0)".to_string(),
        "  /status".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormrunner_scene::AtmosphereConfig;

    #[derive(Default)]
    struct FakeCtx {
        weather: Vec<WeatherCondition>,
        track: usize,
    }

    impl CommandContext for FakeCtx {
        fn request_weather(&mut self, condition: WeatherCondition) -> Result<bool, ConfigError> {
            let changed = self.weather.last() != Some(&condition);
            self.weather.push(condition);
            Ok(changed)
        }

        fn music_next(&mut self) -> Result<Option<ClipId>, ConfigError> {
            self.track += 1;
            Ok(Some(ClipId::new(format!("track_{}", self.track))))
        }

        fn music_previous(&mut self) -> Result<Option<ClipId>, ConfigError> {
            Ok(None)
        }

        fn music_play(&mut self, index: usize) -> Result<ClipId, ConfigError> {
            Err(ConfigError::IndexOutOfRange {
                name: "music track",
                index,
                len: 0,
            })
        }

        fn status_lines(&self) -> Vec<String> {
            vec![format!("{} requests", self.weather.len())]
        }
    }

    #[test]
    fn parses_weather_names_and_aliases() {
        assert_eq!(
            parse_command("/weather heavy_rain"),
            Ok(ConsoleCommand::Weather {
                condition: WeatherCondition::HeavyRain
            })
        );
        assert_eq!(
            parse_command("weather STORM"),
            Ok(ConsoleCommand::Weather {
                condition: WeatherCondition::Storm
            })
        );
        let err = parse_command("/weather hail").unwrap_err();
        assert!(err.to_string().contains("Usage: /weather"));
        assert!(parse_command("/weather").is_err());
    }

    #[test]
    fn parses_music_subcommands() {
        assert_eq!(parse_command("/music next"), Ok(ConsoleCommand::MusicNext));
        assert_eq!(parse_command("/music prev"), Ok(ConsoleCommand::MusicPrevious));
        assert_eq!(
            parse_command("/music play 2"),
            Ok(ConsoleCommand::MusicPlay { index: 2 })
        );
        assert!(parse_command("/music play x").is_err());
        assert!(parse_command("/music next 1").is_err());
        assert!(parse_command("/music").is_err());
    }

    #[test]
    fn empty_input_is_help_and_unknown_is_error() {
        assert_eq!(parse_command("  /  "), Ok(ConsoleCommand::Help));
        assert!(parse_command("/tp 0 0 0")
            .unwrap_err()
            .to_string()
            .contains("Unknown command"));
    }

    #[test]
    fn execute_reports_each_outcome() {
        let mut ctx = FakeCtx::default();
        let storm = ConsoleCommand::Weather {
            condition: WeatherCondition::Storm,
        };
        assert_eq!(
            execute_command(&mut ctx, storm).lines,
            vec!["Weather changing to storm"]
        );
        assert_eq!(
            execute_command(&mut ctx, storm).lines,
            vec!["Weather already storm"]
        );
        assert_eq!(
            execute_command(&mut ctx, ConsoleCommand::MusicNext).lines,
            vec!["Music fading to track_1"]
        );
        assert_eq!(
            execute_command(&mut ctx, ConsoleCommand::MusicPrevious).lines,
            vec!["Playlist is empty"]
        );
        assert!(execute_command(&mut ctx, ConsoleCommand::MusicPlay { index: 4 }).lines[0]
            .starts_with("Error:"));
        assert_eq!(
            execute_command(&mut ctx, ConsoleCommand::Status).lines,
            vec!["2 requests"]
        );
    }

    #[test]
    fn atmosphere_status_mentions_weather_and_music() {
        let mut atmosphere = Atmosphere::new(&AtmosphereConfig::default(), 1).unwrap();
        let out = execute_command(
            &mut atmosphere,
            ConsoleCommand::Weather {
                condition: WeatherCondition::LightRain,
            },
        );
        assert_eq!(out.lines, vec!["Weather changing to light_rain"]);

        let status = execute_command(&mut atmosphere, ConsoleCommand::Status).lines;
        assert!(status.iter().any(|l| l == "weather clear -> light_rain (0%)"));
        assert!(status.iter().any(|l| l == "music music_01"));
        assert!(status.iter().any(|l| l == "ambience silent"));
    }
}
