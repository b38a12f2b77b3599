//! Runtime configuration.
//!
//! Defaults are modest; each can be overridden from the environment:
//!
//! | variable                   | field            | default |
//! |----------------------------|------------------|---------|
//! | `LISPFRONT_ARENA_CAPACITY` | `arena_capacity` | 1 MiB   |
//! | `LISPFRONT_TOKEN_BATCH`    | `token_batch`    | 64      |
//! | `LISPFRONT_MAX_DEPTH`      | `max_depth`      | 256     |
//!
//! `max_depth` is capped at [`MAX_DEPTH_CEILING`]: the parser recurses once per level.

use std::str::FromStr;

pub const ARENA_CAPACITY_VAR: &str = "LISPFRONT_ARENA_CAPACITY";
pub const TOKEN_BATCH_VAR: &str = "LISPFRONT_TOKEN_BATCH";
pub const MAX_DEPTH_VAR: &str = "LISPFRONT_MAX_DEPTH";

/// Deepest nesting any configuration may ask for.
pub const MAX_DEPTH_CEILING: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: could not parse {value:?} as a number")]
    Invalid { var: &'static str, value: String },
    #[error("{var}: must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bytes reserved for each parse's arena.
    pub arena_capacity: usize,
    /// Tokens scanned per batch.
    pub token_batch: u32,
    /// Deepest list nesting the parser will follow.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            arena_capacity: 1024 * 1024,
            token_batch: 64,
            max_depth: 256,
        }
    }
}

impl Config {
    /// Defaults, overridden by any `LISPFRONT_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults, overridden by whatever `lookup` finds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let config = Config {
            arena_capacity: read(&lookup, ARENA_CAPACITY_VAR)?.unwrap_or(defaults.arena_capacity),
            token_batch: read(&lookup, TOKEN_BATCH_VAR)?.unwrap_or(defaults.token_batch),
            max_depth: read(&lookup, MAX_DEPTH_VAR)?
                .map(clamp_depth)
                .unwrap_or(defaults.max_depth),
        };
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}

fn clamp_depth(depth: usize) -> usize {
    if depth > MAX_DEPTH_CEILING {
        tracing::warn!(
            requested = depth,
            ceiling = MAX_DEPTH_CEILING,
            "{MAX_DEPTH_VAR} too large, using the ceiling"
        );
    }
    depth.min(MAX_DEPTH_CEILING)
}

/// Parse a positive number out of `var`, if it's set.
fn read<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })?;
    if parsed == T::default() {
        return Err(ConfigError::Zero { var });
    }
    Ok(Some(parsed))
}
