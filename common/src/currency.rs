//! Currency codes and symbol sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CurrencyError;

/// A normalized currency code.
///
/// Construction trims surrounding whitespace and uppercases, so two codes
/// that differ only in case or padding compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Create a currency, rejecting blank input.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let currency = Self::new(code);
        if currency.0.is_empty() {
            return Err(CurrencyError::Empty);
        }
        Ok(currency)
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Lowercase form, used by upstreams that key their payloads that way.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn nzd() -> Self {
        Self::new("NZD")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

/// Deduplicated, ordered set of requested symbols.
pub type SymbolSet = BTreeSet<Currency>;

/// Normalize any collection of raw codes into a symbol set.
///
/// Blank entries are dropped; duplicates that differ only in case collapse.
pub fn normalize_symbols<I, S>(symbols: I) -> SymbolSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols
        .into_iter()
        .map(Currency::new)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Parse a comma separated symbol list such as `"USD, nzd,,GBP"`.
pub fn parse_symbols(raw: &str) -> Result<SymbolSet, CurrencyError> {
    let symbols = normalize_symbols(raw.split(','));
    if symbols.is_empty() {
        return Err(CurrencyError::NoSymbols(raw.to_string()));
    }
    Ok(symbols)
}

/// Render a symbol set as `USD,NZD` for upstream query strings.
pub fn join_symbols(symbols: &SymbolSet) -> String {
    symbols
        .iter()
        .map(Currency::code)
        .collect::<Vec<_>>()
        .join(",")
}
