//! Optional plugin settings read from Midnight Commander's ini file.
//!
//! The file is parsed once; each plugin then looks at its own section,
//! named after the plugin in lower case, and only at the keys it declares.
//! A missing file, section or option simply yields `None`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\]]+)\]\s*$").expect("valid section regex"));
static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^=:\s][^=:]*?)\s*[=:]\s*(.*?)\s*$").expect("valid option regex")
});

/// Location of the host configuration file: `$XDG_CONFIG_HOME/mc/ini`, or
/// `~/.config/mc/ini` when the variable is unset.
pub fn default_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("mc").join("ini"))
}

/// Every section of an ini file.
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniFile {
    /// Parse ini text. An indented line directly under an option continues
    /// that option's value on a new line; a blank line ends the value.
    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            if line.starts_with(char::is_whitespace)
                && let (Some(section), Some(key)) = (current.as_ref(), last_key.as_ref())
                && let Some(value) = sections.get_mut(section).and_then(|s| s.get_mut(key))
            {
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }
            if let Some(caps) = SECTION_RE.captures(line) {
                let name = caps[1].trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                last_key = None;
                continue;
            }
            let (Some(section), Some(caps)) = (current.as_ref(), OPTION_RE.captures(line)) else {
                last_key = None;
                continue;
            };
            let key = caps[1].to_lowercase();
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.clone(), caps[2].to_string());
            last_key = Some(key);
        }

        Self { sections }
    }

    /// Read and parse `path`; an unreadable file behaves like an empty one.
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                debug!(path = %path.display(), %err, "no configuration loaded");
                Self::default()
            }
        }
    }

    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(name)
    }
}

/// Settings of one plugin.
#[derive(Debug, Clone, Default)]
pub struct Config {
    section: String,
    values: HashMap<String, String>,
}

impl Config {
    /// Settings for `plugin`, keeping only `keys` from its section.
    pub fn for_plugin(ini: &IniFile, plugin: &str, keys: &[&str]) -> Self {
        let section = plugin.to_lowercase();
        let mut values = HashMap::new();

        if let Some(options) = ini.section(&section) {
            for (key, value) in options {
                if keys.contains(&key.as_str()) {
                    values.insert(key.clone(), value.clone());
                } else {
                    warn!(section = %section, key = %key, "ignoring unknown option");
                }
            }
        }

        Self { section, values }
    }

    /// Load the host configuration file and pick out `plugin`'s settings.
    pub fn load(plugin: &str, keys: &[&str]) -> Self {
        let ini = default_path()
            .map(|path| IniFile::load(&path))
            .unwrap_or_default();
        Self::for_plugin(&ini, plugin, keys)
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Raw string value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(Some(true)),
            "0" | "no" | "false" | "off" => Ok(Some(false)),
            _ => Err(invalid(key, value, "boolean")),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.parsed(key, "integer")
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.parsed(key, "float")
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, kind: &'static str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| value.parse().map_err(|_| invalid(key, value, kind)))
            .transpose()
    }
}

fn invalid(key: &str, value: &str, kind: &'static str) -> Error {
    Error::Config {
        key: key.to_string(),
        value: value.to_string(),
        kind,
    }
}
