//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use ini::Ini;
use std::str::FromStr;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in
/// the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cluster] section
    if let Some(section) = ini.section(Some("cluster")) {
        if let Some(v) = section.get("networks") {
            config.cluster.networks = parse_value("cluster", "networks", v)?;
        }
        if let Some(v) = section.get("nodes_per_network") {
            config.cluster.nodes_per_network = parse_value("cluster", "nodes_per_network", v)?;
        }
        if let Some(v) = section.get("tasks") {
            config.cluster.tasks = parse_value("cluster", "tasks", v)?;
        }
    }

    // [simulation] section
    if let Some(section) = ini.section(Some("simulation")) {
        if let Some(v) = section.get("seed") {
            config.simulation.seed = Some(parse_value("simulation", "seed", v)?);
        }
        if let Some(v) = section.get("failure_probability") {
            config.simulation.failure_probability =
                parse_probability("simulation", "failure_probability", v)?;
        }
        if let Some(v) = section.get("processing_error_probability") {
            config.simulation.processing_error_probability =
                parse_probability("simulation", "processing_error_probability", v)?;
        }
        if let Some(v) = section.get("failure_tick_ms") {
            config.simulation.failure_tick_ms = parse_value("simulation", "failure_tick_ms", v)?;
        }
        if let Some(v) = section.get("recovery_min_ms") {
            config.simulation.recovery_min_ms = parse_value("simulation", "recovery_min_ms", v)?;
        }
        if let Some(v) = section.get("recovery_max_ms") {
            config.simulation.recovery_max_ms = parse_value("simulation", "recovery_max_ms", v)?;
        }
        if let Some(v) = section.get("processing_min_ms") {
            config.simulation.processing_min_ms =
                parse_value("simulation", "processing_min_ms", v)?;
        }
        if let Some(v) = section.get("processing_max_ms") {
            config.simulation.processing_max_ms =
                parse_value("simulation", "processing_max_ms", v)?;
        }

        if config.simulation.recovery_min_ms > config.simulation.recovery_max_ms {
            return Err(range_error(
                "recovery_min_ms",
                config.simulation.recovery_min_ms,
                config.simulation.recovery_max_ms,
            ));
        }
        if config.simulation.processing_min_ms > config.simulation.processing_max_ms {
            return Err(range_error(
                "processing_min_ms",
                config.simulation.processing_min_ms,
                config.simulation.processing_max_ms,
            ));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = v.to_string();
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

/// Parses a numeric value, mapping parse failures to `InvalidValue`.
fn parse_value<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a number".to_string(),
        })
}

/// Parses a probability and validates it is within `[0.0, 1.0]`.
fn parse_probability(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let parsed: f64 = parse_value(section, key, value)?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        });
    }
    Ok(parsed)
}

fn range_error(key: &str, min: u64, max: u64) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: "simulation".to_string(),
        key: key.to_string(),
        value: min.to_string(),
        reason: format!("minimum exceeds maximum ({min} > {max})"),
    }
}
