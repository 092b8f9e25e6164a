use std::path::PathBuf;

use thiserror::Error;

/// A dice expression that does not match `NdS`, `NdS+B` or `NdS-B`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("empty dice expression")]
    Empty,
    #[error("dice expression '{0}' has no 'd' separator")]
    MissingSeparator(String),
    #[error("invalid dice count in '{0}'")]
    BadCount(String),
    #[error("invalid die size in '{0}'")]
    BadSides(String),
    #[error("invalid modifier in '{0}'")]
    BadModifier(String),
    #[error("dice expression '{0}' is out of range")]
    OutOfRange(String),
}

/// Failure to read or decode a data file (scenario, monster book, party, config).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8 text")]
    Encoding { path: PathBuf },
    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse YAML {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario content: {0}")]
    Scene(#[from] SceneError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene '{id}' has unknown type '{kind}'")]
    UnknownType { id: String, kind: String },
    #[error("scene record is malformed: {0}")]
    Malformed(String),
    #[error("no scene registered under '{0}'")]
    UnknownScene(String),
    #[error("scene '{from}' points to missing scene '{to}'")]
    DanglingReference { from: String, to: String },
    #[error("scenario has no start scene")]
    NoStart,
    #[error(transparent)]
    Dice(#[from] DiceError),
}
