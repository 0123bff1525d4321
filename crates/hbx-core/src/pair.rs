//! Trading pair identifier.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading pair in BASE-QUOTE format (e.g., "BTC-USDT").
///
/// The Hummingbot API addresses markets by connector name plus trading
/// pair; this type guards the pair format so malformed pairs are caught
/// before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradingPair(String);

impl TradingPair {
    /// Parse and validate a BASE-QUOTE pair.
    ///
    /// Both legs must be non-empty; the separator is a single hyphen.
    /// Token addresses are accepted as legs (gateway pairs use them).
    pub fn new(pair: impl Into<String>) -> Result<Self> {
        let pair = pair.into();
        match pair.split_once('-') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok(Self(pair)),
            _ => Err(CoreError::InvalidPair(format!(
                "expected BASE-QUOTE format, got '{pair}'"
            ))),
        }
    }

    /// Base leg of the pair.
    pub fn base(&self) -> &str {
        self.0.split_once('-').map(|(b, _)| b).unwrap_or(&self.0)
    }

    /// Quote leg of the pair.
    pub fn quote(&self) -> &str {
        self.0.split_once('-').map(|(_, q)| q).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TradingPair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for TradingPair {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
