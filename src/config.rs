// src/config.rs

//! Manages server configuration: loading, environment overrides, and validation.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Settings for the supervised game server process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    /// Working directory of the server; it must contain the jar.
    #[serde(default)]
    pub folder: String,
    /// Heap size handed to the JVM as both `-Xms` and `-Xmx`.
    #[serde(default = "default_memory")]
    pub memory: String,
    #[serde(default = "default_jar")]
    pub jar: String,
    #[serde(default = "default_java")]
    pub java: String,
    #[serde(default)]
    pub jvm_args: Vec<String>,
    #[serde(default = "default_server_args")]
    pub server_args: Vec<String>,
    /// Console command written to stdin to ask the server to stop.
    #[serde(default = "default_stop_command")]
    pub stop_command: String,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    /// Also copy the child's stdout/stderr to our own.
    #[serde(default = "default_true")]
    pub mirror_output: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            memory: default_memory(),
            jar: default_jar(),
            java: default_java(),
            jvm_args: Vec::new(),
            server_args: default_server_args(),
            stop_command: default_stop_command(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            mirror_output: true,
        }
    }
}

impl ProcessConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn default_memory() -> String {
    "2G".to_string()
}
fn default_jar() -> String {
    "minecraft_server.1.16.5.jar".to_string()
}
fn default_java() -> String {
    "java".to_string()
}
fn default_server_args() -> Vec<String> {
    vec!["-nogui".to_string()]
}
fn default_stop_command() -> String {
    "/stop".to_string()
}
fn default_shutdown_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// Settings for the output fan-out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Pub/sub channel the process output is published on.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Bound of the queue between output capture and publishing, in chunks.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            capacity: default_capacity(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl OutputConfig {
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

fn default_channel() -> String {
    "stdout".to_string()
}
fn default_capacity() -> usize {
    1024
}
fn default_purge_interval_secs() -> u64 {
    300
}

/// The main configuration struct for the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    6379
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: String::new(),
            log_level: default_log_level(),
            process: ProcessConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Reads and parses a TOML file. Overrides and validation are not applied.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds the effective configuration: the file at `path` if it exists
    /// (defaults otherwise), then environment overrides, then validation.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) if Path::new(path).exists() => {
                info!("Loading configuration from '{path}'");
                Self::from_file(path)?
            }
            Some(path) => {
                warn!("Config file '{path}' not found, relying on defaults and environment");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `MINECRAFT_*` and `REDIS_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(folder) = get("MINECRAFT_FOLDER") {
            self.process.folder = folder;
        }
        if let Some(memory) = get("MINECRAFT_MEMORY") {
            self.process.memory = memory;
        }
        if let Some(jar) = get("MINECRAFT_JAR") {
            self.process.jar = jar;
        }
        if let Some(password) = get("REDIS_PASSWORD") {
            self.password = password;
        }
        if let Some(addr) = get("REDIS_ADDR") {
            let (host, port) = addr
                .rsplit_once(':')
                .ok_or_else(|| anyhow!("REDIS_ADDR must be 'host:port' or ':port', got '{addr}'"))?;
            self.port = port
                .parse()
                .with_context(|| format!("Invalid port in REDIS_ADDR '{addr}'"))?;
            self.host = if host.is_empty() {
                default_host()
            } else {
                host.to_string()
            };
        }
        Ok(())
    }

    /// Validates the resolved configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(anyhow!(
                "a password is required (set `password` or REDIS_PASSWORD)"
            ));
        }
        if self.process.folder.trim().is_empty() {
            return Err(anyhow!(
                "a server folder is required (set `process.folder` or MINECRAFT_FOLDER)"
            ));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.output.capacity == 0 {
            return Err(anyhow!("output.capacity cannot be 0"));
        }
        if self.output.channel.is_empty() {
            return Err(anyhow!("output.channel cannot be empty"));
        }
        if self.process.stop_command.trim().is_empty() {
            return Err(anyhow!("process.stop_command cannot be empty"));
        }
        if self.output.purge_interval_secs == 0 {
            return Err(anyhow!("output.purge_interval_secs cannot be 0"));
        }
        Ok(())
    }

    /// The address the RESP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
