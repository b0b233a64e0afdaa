//! Stock numbers, the inventory key campaigns hang off.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Error type for stock number parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStockNumberError {
    /// The rejected input.
    pub input: String,
}

impl Display for ParseStockNumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid stock number: {:?}", self.input)
    }
}

impl std::error::Error for ParseStockNumberError {}

/// The unique inventory identifier of a campaign.
///
/// Stock numbers come from the dealership's inventory feed and are
/// embedded verbatim in post text, which is what lets reconciliation
/// re-match a scheduler post to its campaign after the provider churns
/// the post's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockNumber(String);

impl StockNumber {
    /// Create a stock number from raw input, trimming surrounding
    /// whitespace. Empty input is rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseStockNumberError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseStockNumberError { input: raw });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the stock number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against arbitrary post text.
    ///
    /// This is the remap heuristic: a scheduler post whose text
    /// contains the stock number is assumed to belong to this campaign.
    #[must_use]
    pub fn is_contained_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl Display for StockNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StockNumber {
    type Err = ParseStockNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_rejects_empty() {
        assert_eq!(StockNumber::new("  ABC-123 ").unwrap().as_str(), "ABC-123");
        assert!(StockNumber::new("").is_err());
        assert!(StockNumber::new("   ").is_err());
    }

    #[test]
    fn test_is_contained_in_is_case_insensitive() {
        let sn = StockNumber::new("ABC-123").unwrap();
        assert!(sn.is_contained_in("New arrival! abc-123 just hit the lot"));
        assert!(sn.is_contained_in("ABC-123"));
        assert!(!sn.is_contained_in("XYZ-999 just hit the lot"));
    }

    #[test]
    fn test_serde_transparent() {
        let sn = StockNumber::new("ABC-123").unwrap();
        assert_eq!(serde_json::to_string(&sn).unwrap(), "\"ABC-123\"");
        let parsed: StockNumber = serde_json::from_str("\"ABC-123\"").unwrap();
        assert_eq!(parsed, sn);
    }
}
