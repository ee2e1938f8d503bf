//! Declarative `deploy` config parser.
//!
//! Line-oriented, indentation-significant key/value text (§6). A single-pass
//! line scanner, not a general indent-tree parser: grounded on
//! `yaml_parser.c`'s `parse_yaml_line`/`extract_lxc_config`, which themselves
//! only ever read flat top-level `key: value` pairs — this parser keeps that
//! restriction rather than building the original's unused nested-node tree.

use thiserror::Error;

use fleet_core::{ContainerSpec, SpecError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required key 'name'")]
    MissingName,
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_file(path: &std::path::Path) -> Result<ContainerSpec, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse the declarative text into a [`ContainerSpec`]. Unknown
    /// top-level keys are ignored, matching both spec.md and the original's
    /// `extract_lxc_config`, which only ever reads the keys it knows about.
    pub fn parse(text: &str) -> Result<ContainerSpec, ConfigError> {
        let mut name = None;
        let mut image = None;
        let mut cpu_limit = 0u32;
        let mut memory_limit = 0u32;
        let mut privileged = false;
        let mut env = Vec::new();
        let mut mounts = Vec::new();
        let mut network = None;

        for line in text.lines() {
            let Some((key, value)) = parse_line(line) else { continue };
            match key {
                "name" => name = Some(value.to_string()),
                "image" => image = Some(value.to_string()),
                "cpu_limit" => cpu_limit = value.parse().unwrap_or(0),
                "memory_limit" => memory_limit = value.parse().unwrap_or(0),
                "privileged" => privileged = value == "true",
                "environment" => env = parse_env_list(value),
                "mounts" => mounts = parse_comma_list(value),
                "network" => network = Some(value.to_string()),
                // "config" (generated per-container config file path) and
                // anything else are out of scope for the core — ignored.
                _ => {}
            }
        }

        let name = name.ok_or(ConfigError::MissingName)?;
        let spec =
            ContainerSpec { name, image, cpu_limit, memory_limit, privileged, env, mounts, network };
        spec.validate()?;
        Ok(spec)
    }
}

/// Parse one line into `(key, value)`, skipping blank lines and `#`
/// comments. Indentation is significant only in that it is stripped before
/// the `key:` scan — this parser has no nested structure to indent into.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, rest) = trimmed.split_once(':')?;
    Some((key.trim(), rest.trim()))
}

fn parse_comma_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn parse_env_list(value: &str) -> Vec<(String, String)> {
    parse_comma_list(value)
        .into_iter()
        .filter_map(|pair| pair.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
