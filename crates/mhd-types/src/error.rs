// ─────────────────────────────────────────────────────────────────────
// SCPN MHD Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MhdError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Variable '{0}' is not registered")]
    MissingVariable(&'static str),

    #[error("Unknown variable name '{0}'")]
    UnknownVariable(String),

    #[error("Variable '{0}' is already registered")]
    DuplicateVariable(&'static str),

    #[error("Shape mismatch for '{name}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Missing runtime parameter '{0}'")]
    MissingParameter(String),


    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type MhdResult<T> = Result<T, MhdError>;
