use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Correct answers required before the vocabulary module unlocks.
    #[serde(default = "default_target_correct")]
    pub target_correct: u32,
    /// How long the verdict stays on screen before the next question.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Vocabulary file override; empty means the default data-dir location.
    #[serde(default)]
    pub vocab_file: String,
    /// Reading test descriptor override; empty means the bundled sample.
    #[serde(default)]
    pub reading_file: String,
    /// Sentence-grading service endpoint; empty means the offline judge.
    #[serde(default)]
    pub grader_url: String,
}

fn default_target_correct() -> u32 {
    3
}
fn default_reveal_delay_ms() -> u64 {
    1200
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_correct: default_target_correct(),
            reveal_delay_ms: default_reveal_delay_ms(),
            theme: default_theme(),
            vocab_file: String::new(),
            reading_file: String::new(),
            grader_url: String::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyguard")
            .join("config.toml")
    }

    /// Clamp hand-edited values into usable ranges.
    pub fn validate(&mut self) {
        self.target_correct = self.target_correct.clamp(1, 50);
        self.reveal_delay_ms = self.reveal_delay_ms.min(10_000);
        if self.theme.is_empty() {
            self.theme = default_theme();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_document() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.target_correct, 3);
        assert_eq!(config.reveal_delay_ms, 1200);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(config.grader_url.is_empty());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
target_correct = 5
grader_url = "http://localhost:8080/grade"
"#,
        )
        .unwrap();
        assert_eq!(config.target_correct, 5);
        assert_eq!(config.grader_url, "http://localhost:8080/grade");
        assert_eq!(config.reveal_delay_ms, 1200);
    }

    #[test]
    fn roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.target_correct, deserialized.target_correct);
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.vocab_file, deserialized.vocab_file);
    }

    #[test]
    fn validate_clamps() {
        let mut config = Config {
            target_correct: 0,
            reveal_delay_ms: 60_000,
            theme: String::new(),
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.target_correct, 1);
        assert_eq!(config.reveal_delay_ms, 10_000);
        assert_eq!(config.theme, "catppuccin-mocha");
    }
}
