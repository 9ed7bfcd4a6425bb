//! Aggregated rate results and the keys they are cached under.

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::currency::{normalize_symbols, Currency, SymbolSet};

/// Number of fractional digits every aggregated rate carries.
pub const RATE_SCALE: u32 = 6;

/// Symbol to rate mapping.
pub type RateMap = BTreeMap<Currency, Decimal>;

/// Cache key for an aggregated lookup.
///
/// Both parts are normalized on construction, so `("eur", ["usd", "Usd"])`
/// and `("EUR", ["USD"])` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    base: Currency,
    symbols: SymbolSet,
}

impl CacheKey {
    /// Create a key from already normalized parts.
    pub fn new(base: Currency, symbols: SymbolSet) -> Self {
        Self { base, symbols }
    }

    /// Create a key from raw strings.
    pub fn from_raw<I, S>(base: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Currency::new(base), normalize_symbols(symbols))
    }

    pub fn base(&self) -> &Currency {
        &self.base
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.base)?;
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", symbol)?;
        }
        f.write_str("]")
    }
}

/// Consensus rates for one base currency.
///
/// A requested symbol missing from `rates` means no provider returned a
/// usable value for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesResult {
    /// Normalized base currency.
    pub base: Currency,
    /// Averaged rate per symbol, rendered as JSON numbers.
    #[serde(serialize_with = "serialize_rates")]
    pub rates: RateMap,
}

impl RatesResult {
    /// Create a new result.
    pub fn new(base: Currency, rates: RateMap) -> Self {
        Self { base, rates }
    }

    /// Create a result with no rates.
    pub fn empty(base: Currency) -> Self {
        Self::new(base, RateMap::new())
    }

    /// Get the rate for a symbol.
    pub fn rate(&self, symbol: &Currency) -> Option<Decimal> {
        self.rates.get(symbol).copied()
    }

    /// Check if no symbol could be resolved.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

struct FloatRate<'a>(&'a Decimal);

impl Serialize for FloatRate<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(self.0, serializer)
    }
}

fn serialize_rates<S: Serializer>(rates: &RateMap, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(rates.len()))?;
    for (symbol, rate) in rates {
        map.serialize_entry(symbol, &FloatRate(rate))?;
    }
    map.end()
}
