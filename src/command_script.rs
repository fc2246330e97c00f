use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};
use stormrunner_core::SimTick;

#[derive(Debug, Deserialize)]
struct CommandScriptFile {
    steps: Vec<CommandScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandScriptStep {
    tick: SimTick,
    command: String,
}

/// Console commands scheduled on simulation ticks.
///
/// Scripts are a JSON list of `{tick, command}` steps, executed in file order.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    pending: VecDeque<CommandScriptStep>,
}

impl CommandScriptPlayer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read command script {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid command script {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: CommandScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        for step in file.steps {
            let command = step.command.trim().to_string();
            if command.is_empty() {
                anyhow::bail!("command script contains an empty command");
            }
            if pending
                .back()
                .is_some_and(|prev: &CommandScriptStep| step.tick < prev.tick)
            {
                anyhow::bail!("command script steps must be sorted by tick");
            }
            pending.push_back(CommandScriptStep {
                tick: step.tick,
                command,
            });
        }

        Ok(Self { pending })
    }

    /// Remove and return every command due at or before `tick`.
    pub fn drain_ready_commands(&mut self, tick: SimTick) -> Vec<String> {
        let ready = self
            .pending
            .iter()
            .take_while(|step| step.tick <= tick)
            .count();
        self.pending.drain(..ready).map(|step| step.command).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsorted_ticks() {
        let json = r#"{
            "steps": [
                {"tick": 2, "command": "/weather storm"},
                {"tick": 1, "command": "/weather clear"}
            ]
        }"#;
        let err = CommandScriptPlayer::parse(json).unwrap_err();
        assert!(
            err.to_string().contains("sorted by tick"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn rejects_empty_scripts_and_commands() {
        assert!(CommandScriptPlayer::parse(r#"{"steps": []}"#).is_err());
        assert!(
            CommandScriptPlayer::parse(r#"{"steps": [{"tick": 0, "command": "  "}]}"#).is_err()
        );
    }

    #[test]
    fn drains_in_order() {
        let json = r#"{
            "steps": [
                {"tick": 1, "command": "/weather storm"},
                {"tick": 1, "command": "/music next"},
                {"tick": 3, "command": " /status "}
            ]
        }"#;
        let mut script = CommandScriptPlayer::parse(json).expect("script should parse");

        assert!(script.drain_ready_commands(SimTick(0)).is_empty());
        assert_eq!(
            script.drain_ready_commands(SimTick(1)),
            vec!["/weather storm".to_string(), "/music next".to_string()]
        );
        assert!(script.drain_ready_commands(SimTick(2)).is_empty());
        assert!(!script.is_finished());
        assert_eq!(
            script.drain_ready_commands(SimTick(10)),
            vec!["/status".to_string()]
        );
        assert!(script.is_finished());
    }
}
