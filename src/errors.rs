// src/errors.rs

//! Crate-wide error type and Result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid time of day '{0}'; expected HH:MM (e.g. 03:00)")]
    InvalidTimeOfDay(String),

    #[error("a maintenance run is already active")]
    RunActive,

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MaintError>;
