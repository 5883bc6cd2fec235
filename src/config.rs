/*============================================================
  Synavera Project: Quack
  Module: quack::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load Quack's own TOML configuration and read the system
    pacman.conf for repository names and colour preference.

  Security / Safety Notes:
    Both files are read-only inputs; nothing is written back.

  Dependencies:
    serde + toml for the Quack file, dirs for XDG locations.

  Operational Scope:
    Resolved once at start-up and passed by reference to the
    AUR client, the install pipeline and the logger.

  Revision History:
    2026-10-19 COD  Authored configuration layer for Quack.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Defaults for every key; the file itself is optional
    - Explicit errors naming the offending path
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QuackError, Result};
use crate::output::ColorMode;

const DEFAULT_RPC_URL: &str = "https://aur.archlinux.org/rpc.php";
const DEFAULT_WEB_URL: &str = "https://aur.archlinux.org";

/// Top-level Quack configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuackConfig {
    pub aur: AurConfig,
    pub paths: PathsConfig,
}

/// Endpoints of the AUR.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AurConfig {
    /// RPC endpoint queried for `info` and `search`.
    pub rpc_url: String,
    /// Web root; package git remotes, account and package pages hang off it.
    pub web_url: String,
    /// Request timeout in seconds. Unset leaves the transport default.
    pub timeout: Option<u64>,
}

impl Default for AurConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            timeout: None,
        }
    }
}

/// Filesystem locations used by Quack.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub pacman_conf: PathBuf,
    pub package_cache: PathBuf,
    /// Where built packages are kept when `pacman -U` fails.
    pub fallback_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pacman_conf: PathBuf::from("/etc/pacman.conf"),
            package_cache: PathBuf::from("/var/cache/pacman/pkg"),
            fallback_dir: PathBuf::from("/tmp"),
            log_dir: None,
        }
    }
}

impl QuackConfig {
    /// Load from an explicit path, or from the XDG location when present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file silently yields the defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            QuackError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::parse(&raw)
            .map_err(|err| QuackError::Config(format!("Invalid config {}: {err}", path.display())))
    }

    fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Directory holding session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.paths.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join("quack")
                .join("logs")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quack").join("config.toml"))
}

/// What Quack takes from pacman.conf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacmanConf {
    /// Every repository section, in file order.
    pub repos: Vec<String>,
    /// Colour preference from `[options]`, if the `Color` key is present.
    pub color: Option<ColorMode>,
}

impl PacmanConf {
    /// Read pacman.conf; a missing file yields no repositories and no colour.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| {
            QuackError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Ok(Self::parse(&raw))
    }

    /// Parse the INI-style pacman.conf body.
    pub fn parse(raw: &str) -> Self {
        let mut conf = Self::default();
        let mut section: Option<String> = None;

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                let name = name.trim().to_string();
                if name != "options" && !conf.repos.contains(&name) {
                    conf.repos.push(name.clone());
                }
                section = Some(name);
                continue;
            }
            if section.as_deref() != Some("options") {
                continue;
            }
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (line, None),
            };
            if key == "Color" {
                conf.color = match value {
                    None | Some("") => Some(ColorMode::Auto),
                    Some(value) => ColorMode::parse(value).or(Some(ColorMode::Auto)),
                };
            }
        }

        conf
    }
}
