use pit_core::{BracketError, TaxpayerError};
use thiserror::Error;

/// Errors that can occur when loading regime constants from files.
#[derive(Debug, Error)]
pub enum RegimeLoadError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("invalid bracket for regime '{regime}': {source}")]
    InvalidBracket {
        regime: String,
        #[source]
        source: BracketError,
    },

    #[error("regime '{0}' has no brackets")]
    MissingBrackets(String),

    #[error("brackets reference undeclared regime '{0}'")]
    UnknownRegime(String),

    #[error("regime '{0}' is declared more than once")]
    DuplicateRegime(String),

    #[error("regime '{regime}' is invalid: {source}")]
    InvalidRegime {
        regime: String,
        #[source]
        source: TaxpayerError,
    },
}

impl From<csv::Error> for RegimeLoadError {
    fn from(err: csv::Error) -> Self {
        RegimeLoadError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for RegimeLoadError {
    fn from(err: toml::de::Error) -> Self {
        RegimeLoadError::TomlParse(err.to_string())
    }
}
