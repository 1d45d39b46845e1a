use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the gross/net relation the caller supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryType {
    #[default]
    Gross,
    Net,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown salary type '{0}' (expected 'gross' or 'net')")]
pub struct ParseSalaryTypeError(String);

impl SalaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gross => "gross",
            Self::Net => "net",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gross" => Some(Self::Gross),
            "net" => Some(Self::Net),
            _ => None,
        }
    }
}

impl FromStr for SalaryType {
    type Err = ParseSalaryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.to_ascii_lowercase()).ok_or_else(|| ParseSalaryTypeError(s.to_string()))
    }
}

impl fmt::Display for SalaryType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
