use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Availability of the watched product as recorded between checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    Unavailable,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unrecognised product status `{0}` (expected available|unavailable)")]
pub struct StatusParseError(pub String);

impl ProductStatus {
    pub fn from_stock(has_stock: bool) -> Self {
        if has_stock {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }

    /// Returns true when a previously recorded raw value means the product was
    /// already available. Missing or unrecognised values count as not available.
    pub fn was_available(previous: Option<&str>) -> bool {
        previous.and_then(|raw| raw.parse::<Self>().ok()) == Some(Self::Available)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
