//! TOML settings for the headless adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use geometropolis_core::ResourceKind;
use geometropolis_system_gathering::{self as gathering, LayoutTuning};
use geometropolis_world as world;
use serde::{Deserialize, Serialize};

/// Everything the adapter can be configured with; missing keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) world: world::Config,
    pub(crate) gathering: GatheringSettings,
}

/// Parameters shared by every gathering session the bot plays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GatheringSettings {
    pub(crate) play_area_width: f32,
    pub(crate) play_area_height: f32,
    pub(crate) rng_seed: u64,
    pub(crate) duration_secs: u32,
    pub(crate) layout: LayoutTuning,
}

impl Default for GatheringSettings {
    fn default() -> Self {
        let session = gathering::Config::default();
        Self {
            play_area_width: 1920.0,
            play_area_height: 1080.0,
            rng_seed: session.rng_seed,
            duration_secs: session.duration_secs,
            layout: session.layout,
        }
    }
}

impl GatheringSettings {
    /// Session config for `resource` in `round`; every session gets its own seed.
    pub(crate) fn session_config(&self, resource: ResourceKind, round: u32) -> gathering::Config {
        let lane = match resource {
            ResourceKind::Wood => 0,
            ResourceKind::Stone => 1,
        };
        gathering::Config {
            resource,
            rng_seed: self
                .rng_seed
                .wrapping_add(u64::from(round).wrapping_mul(2))
                .wrapping_add(lane),
            duration_secs: self.duration_secs,
            layout: self.layout,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }

    /// Replaces both seeds with `seed`.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.world.rng_seed = seed;
        self.gathering.rng_seed = seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [world]
            starting_wood = 40

            [world.targets]
            max = 12

            [gathering]
            duration_secs = 10

            [gathering.layout]
            max_attempts = 5
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.world.starting_wood, 40);
        assert_eq!(settings.world.starting_stone, 100);
        assert_eq!(settings.world.targets.max, 12);
        assert_eq!(settings.world.targets.min, 1);
        assert_eq!(settings.gathering.duration_secs, 10);
        assert_eq!(settings.gathering.layout.max_attempts, 5);
        assert_eq!(settings.gathering.layout.spacing_buffer, 50.0);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").expect("empty"), Settings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Settings::from_toml("[world]\nrows = \"many\"").is_err());
    }

    #[test]
    fn sessions_get_distinct_seeds() {
        let mut settings = Settings::default();
        settings.reseed(5);
        let wood = settings.gathering.session_config(ResourceKind::Wood, 1);
        let stone = settings.gathering.session_config(ResourceKind::Stone, 1);
        let next = settings.gathering.session_config(ResourceKind::Wood, 2);
        assert_eq!(wood.rng_seed, 7);
        assert_eq!(stone.rng_seed, 8);
        assert_eq!(next.rng_seed, 9);
        assert_eq!(settings.world.rng_seed, 5);
    }
}
