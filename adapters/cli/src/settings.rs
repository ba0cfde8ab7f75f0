//! Session configuration loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use trick_or_treat_world::SessionConfig;

/// Street played when no configuration file is given.
const BUNDLED_SESSION: &str = include_str!("../session.toml");

/// Loads and validates the session configuration at `path`, or the bundled one.
pub(crate) fn load(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read session config {}", path.display()))?;
            parse(&contents).with_context(|| format!("invalid session config {}", path.display()))
        }
        None => parse(BUNDLED_SESSION).context("bundled session config is invalid"),
    }
}

fn parse(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse session config toml")?;
    config
        .validate()
        .context("session config failed validation")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trick_or_treat_core::HouseId;

    #[test]
    fn bundled_session_matches_the_default_street() {
        let config = load(None).expect("bundled config parses");
        assert_eq!(config.houses.len(), 4);
        assert_eq!(config.houses[0].trigger.min, 4.5);
        assert_eq!(config.run.run_seconds, 180.0);
        assert!(config.camera.follow_bounds.is_some());
        let third = config
            .houses
            .iter()
            .find(|house| house.id == HouseId::new(3))
            .expect("house 3 is configured");
        assert_eq!(third.door.as_ref().map(|door| door.knock_count), Some(3));
        assert_eq!(third.door.as_ref().map(|door| door.knock_delay), Some(0.2));
    }

    #[test]
    fn partial_files_keep_the_defaults() {
        let config = parse("[run]\nrun_seconds = 30.0\n").expect("partial config parses");
        assert_eq!(config.run.run_seconds, 30.0);
        assert_eq!(config.houses, SessionConfig::default().houses);
        assert_eq!(config.qte.length, 3);
    }

    #[test]
    fn invalid_values_are_reported() {
        let error = parse("[run]\nrun_seconds = 0.0\n").expect_err("zero run length is rejected");
        assert!(format!("{error:#}").contains("run length must be positive"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let error = parse("[run\n").expect_err("broken toml is rejected");
        assert!(format!("{error:#}").contains("failed to parse session config toml"));
    }
}
