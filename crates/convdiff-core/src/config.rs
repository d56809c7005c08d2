#![forbid(unsafe_code)]

//! Line-oriented `key = value [# comment]` settings with typed coercion.
//!
//! Parsing rules mirror the historical harness exactly: blank lines and
//! `#`-prefixed lines are skipped, lines without `=` are silently skipped,
//! the value is cut at the first inline `#`, and coercion tries Bool, then
//! Int, then a non-negative decimal Float, before falling back to Text.
//! Negative numbers and scientific notation therefore stay textual; the
//! typed accessors fall back to the hard-coded default in that case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A coerced configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = raw.parse::<i64>() {
                return Self::Int(value);
            }
        }
        if is_plain_decimal(raw) {
            if let Ok(value) = raw.parse::<f64>() {
                return Self::Float(value);
            }
        }
        Self::Text(raw.to_owned())
    }
}

/// True when removing at most one `.` leaves a non-empty all-digit string.
fn is_plain_decimal(raw: &str) -> bool {
    let stripped = raw.replacen('.', "", 1);
    !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit())
}

/// Immutable harness configuration: a mapping from option name to typed
/// value, constructed once at startup and passed by reference thereafter.
///
/// Unknown keys from the file are stored but unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSettings {
    values: BTreeMap<String, ConfigValue>,
}

pub const DEFAULT_NUM_TESTS: usize = 100;
pub const DEFAULT_EPSILON: f64 = 1e-4;

impl HarnessSettings {
    #[must_use]
    pub fn defaults() -> Self {
        let mut values = BTreeMap::new();
        values.insert("regenerate_input".to_owned(), ConfigValue::Bool(false));
        values.insert(
            "cpp_file".to_owned(),
            ConfigValue::Text("convolution.cpp".to_owned()),
        );
        values.insert(
            "exe_name".to_owned(),
            ConfigValue::Text("convolution".to_owned()),
        );
        values.insert(
            "num_tests".to_owned(),
            ConfigValue::Int(DEFAULT_NUM_TESTS as i64),
        );
        values.insert(
            "mars_jar".to_owned(),
            ConfigValue::Text("Mars4_5.jar".to_owned()),
        );
        values.insert(
            "asm_file".to_owned(),
            ConfigValue::Text("convolution.asm".to_owned()),
        );
        values.insert("epsilon".to_owned(), ConfigValue::Float(DEFAULT_EPSILON));
        Self { values }
    }

    /// Load settings from `path`, overlaying the defaults. A missing file
    /// returns the defaults unchanged.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Self::defaults(),
        }
    }

    /// Parse settings text, overlaying the defaults. A malformed line is
    /// silently skipped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut settings = Self::defaults();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.split('#').next().unwrap_or("").trim();
            settings
                .values
                .insert(key.to_owned(), ConfigValue::coerce(value));
        }
        settings
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn regenerate_input(&self) -> bool {
        match self.values.get("regenerate_input") {
            Some(ConfigValue::Bool(value)) => *value,
            _ => false,
        }
    }

    #[must_use]
    pub fn num_tests(&self) -> usize {
        match self.values.get("num_tests") {
            Some(ConfigValue::Int(value)) if *value >= 0 => *value as usize,
            _ => DEFAULT_NUM_TESTS,
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f64 {
        match self.values.get("epsilon") {
            Some(ConfigValue::Float(value)) => *value,
            Some(ConfigValue::Int(value)) => *value as f64,
            _ => DEFAULT_EPSILON,
        }
    }

    #[must_use]
    pub fn cpp_file(&self) -> PathBuf {
        self.path_of("cpp_file", "convolution.cpp")
    }

    #[must_use]
    pub fn exe_name(&self) -> PathBuf {
        self.path_of("exe_name", "convolution")
    }

    #[must_use]
    pub fn mars_jar(&self) -> PathBuf {
        self.path_of("mars_jar", "Mars4_5.jar")
    }

    #[must_use]
    pub fn asm_file(&self) -> PathBuf {
        self.path_of("asm_file", "convolution.asm")
    }

    fn path_of(&self, key: &str, fallback: &str) -> PathBuf {
        match self.values.get(key) {
            Some(ConfigValue::Text(value)) => PathBuf::from(value),
            _ => PathBuf::from(fallback),
        }
    }
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self::defaults()
    }
}
