//! CLI argument definitions for the Jarvis server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use jarvis_core::{JarvisConfig, JarvisError};

/// Jarvis - a conversational assistant with skills, document QA and web search.
#[derive(Parser, Debug)]
#[command(name = "jarvis", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the memory store and uploads.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Priority: --config flag > JARVIS_CONFIG env var > ~/.jarvis/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("JARVIS_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > JARVIS_PORT env var > config file value > 8000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("JARVIS_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        8000
    }

    /// Load the resolved config file (defaults when it cannot be read) and
    /// fold in the overrides.
    ///
    /// Runs before tracing is installed, so a load failure is handed back to
    /// be logged once the subscriber exists.
    pub fn load_config(&self) -> (JarvisConfig, Option<JarvisError>) {
        let (mut config, error) = match JarvisConfig::load(&self.resolve_config_path()) {
            Ok(config) => (config, None),
            Err(e) => (JarvisConfig::default(), Some(e)),
        };
        self.apply(&mut config);
        (config, error)
    }

    /// Fold the command-line overrides into a loaded configuration.
    pub fn apply(&self, config: &mut JarvisConfig) {
        config.general.port = self.resolve_port(config.general.port);
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".jarvis").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".jarvis").join("config.toml");
    }
    PathBuf::from("config.toml")
}
