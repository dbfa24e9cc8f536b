use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sims_core::{StopWords, DEFAULT_KEYWORD_LIMIT};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "sims.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub bind: String,
    pub keyword_limit: usize,
    /// Serve a JSON snapshot instead of calling the upstream API.
    pub fixture: Option<PathBuf>,
    /// Words ignored by keyword analysis on top of the built-in list.
    pub extra_stopwords: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            timeout: Duration::from_secs(30),
            bind: "127.0.0.1:8080".into(),
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
            fixture: None,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Shape of `sims.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    bind: Option<String>,
    keyword_limit: Option<usize>,
    fixture: Option<PathBuf>,
    stopwords: Option<Vec<String>>,
}

impl Settings {
    /// Defaults, then the config file, then environment variables.
    ///
    /// An explicit `path` must exist; otherwise `sims.toml` in the working
    /// directory is read when present.
    pub fn load<F>(path: Option<&Path>, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        let file = match path {
            Some(path) => Some(read_file(path)?),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Some(read_file(default)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            settings.apply_file(file);
        }

        settings.apply_env(env);
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        match file.timeout_secs {
            Some(0) => warn!("Ignoring timeout_secs = 0 in config file: not a positive number"),
            Some(v) => self.timeout = Duration::from_secs(v),
            None => {}
        }
        if let Some(v) = file.bind {
            self.bind = v;
        }
        if let Some(v) = file.keyword_limit {
            self.keyword_limit = v;
        }
        if let Some(v) = file.fixture {
            self.fixture = Some(v);
        }
        if let Some(v) = file.stopwords {
            self.extra_stopwords = v;
        }
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("SIMS_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = v;
        }
        if let Some(v) = env("SIMS_BIND").filter(|v| !v.trim().is_empty()) {
            self.bind = v;
        }
        if let Some(v) = env("SIMS_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring SIMS_TIMEOUT_SECS={:?}: not a positive number", v),
            }
        }
    }

    /// Command-line flags take precedence over everything else.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        timeout: Option<Duration>,
        fixture: Option<PathBuf>,
    ) -> Self {
        if let Some(v) = api_url {
            self.api_url = v;
        }
        if let Some(v) = timeout {
            self.timeout = v;
        }
        if let Some(v) = fixture {
            self.fixture = Some(v);
        }
        self
    }

    pub fn stopwords(&self) -> StopWords {
        let mut stopwords = StopWords::english();
        for word in &self.extra_stopwords {
            stopwords.insert(word);
        }
        stopwords
    }
}

fn read_file(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let file = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    debug!("Loaded settings from {}", path.display());
    Ok(file)
}
