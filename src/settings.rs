use crate::scoring::detector::{CompiledLexicon, Lexicon, LexiconError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: Server,
    pub rubrics: Rubrics,
    pub detector: Detector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub demo_mode: bool,
    pub evaluation_delay_ms: u64,
    pub demo_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rubrics {
    pub path: PathBuf,
    pub watch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detector {
    /// RON lexicon replacing the builtin tables.
    pub lexicon_path: Option<PathBuf>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            demo_mode: false,
            evaluation_delay_ms: 0,
            demo_delay_ms: 0,
        }
    }
}

impl Default for Rubrics {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rubrics.default.ron"),
            watch: true,
        }
    }
}

impl Detector {
    pub fn load_lexicon(&self) -> Result<CompiledLexicon, LexiconError> {
        match &self.lexicon_path {
            Some(path) => Lexicon::load(path)?.compile(),
            None => Lexicon::builtin().compile(),
        }
    }
}

fn env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(|| {
            let mut settings = Self::load_from_files(
                Path::new("settings.default.ron"),
                Path::new("settings.ron"),
            );
            settings.apply_overrides(|key| env::var(key).ok());
            settings
        })
    }

    fn load_from_files(default_path: &Path, override_path: &Path) -> Settings {
        let mut settings = if default_path.exists() {
            fs::read_to_string(default_path)
                .ok()
                .and_then(|content| ron::from_str(&content).ok())
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(override_path) {
                if let Ok(overrides) = ron::from_str::<Settings>(&content) {
                    settings = overrides;
                }
            }
        }

        settings
    }

    /// Applies `HOST`, `PORT`, `DEMO_MODE`, `RUBRICS_PATH` and `LEXICON_PATH`.
    /// Unparseable values leave the file setting in place.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(demo) = lookup("DEMO_MODE").as_deref().and_then(env_flag) {
            self.server.demo_mode = demo;
        }
        if let Some(path) = lookup("RUBRICS_PATH").filter(|p| !p.is_empty()) {
            self.rubrics.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LEXICON_PATH").filter(|p| !p.is_empty()) {
            self.detector.lexicon_path = Some(PathBuf::from(path));
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}
