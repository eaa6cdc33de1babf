use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument used when no symbol is supplied.
pub const DEFAULT_SYMBOL: &str = "SPY";

/// Ticker symbol identifying the single instrument a run works on.
///
/// Symbols are upper-cased on construction so `spy` and `SPY` name the same
/// instrument. Provider-specific suffixes such as `ES=F` or `^GSPC` are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a ticker string.
    ///
    /// # Errors
    /// Returns an error if the ticker is empty or contains characters that
    /// cannot appear in a provider URL path segment.
    pub fn new(ticker: impl Into<String>) -> Result<Self, SymbolError> {
        let ticker = ticker.into().trim().to_ascii_uppercase();
        Self::validate(&ticker)?;
        Ok(Symbol(ticker))
    }

    fn validate(ticker: &str) -> Result<(), SymbolError> {
        if ticker.is_empty() {
            return Err(SymbolError::Empty);
        }

        // Alphanumerics plus the punctuation Yahoo uses for indices, futures and share classes
        if !ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '=' | '^'))
        {
            return Err(SymbolError::InvalidCharacters(ticker.to_string()));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol(DEFAULT_SYMBOL.to_string())
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when creating a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Symbol is empty
    Empty,
    /// Symbol contains characters outside the allowed set
    InvalidCharacters(String),
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::Empty => write!(f, "Symbol cannot be empty"),
            SymbolError::InvalidCharacters(ticker) => {
                write!(f, "Symbol '{}' contains invalid characters", ticker)
            }
        }
    }
}

impl std::error::Error for SymbolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_uppercased() {
        let symbol = Symbol::new("spy").unwrap();
        assert_eq!(symbol.as_str(), "SPY");
        assert_eq!(symbol, Symbol::default());
    }

    #[test]
    fn test_symbol_accepts_provider_suffixes() {
        assert_eq!(Symbol::new("ES=F").unwrap().as_str(), "ES=F");
        assert_eq!(Symbol::new("^gspc").unwrap().as_str(), "^GSPC");
        assert_eq!(Symbol::new("BRK-B").unwrap().as_str(), "BRK-B");
    }

    #[test]
    fn test_symbol_rejects_empty() {
        assert_eq!(Symbol::new("   ").unwrap_err(), SymbolError::Empty);
    }

    #[test]
    fn test_symbol_rejects_path_characters() {
        let err = "SPY/../x".parse::<Symbol>().unwrap_err();
        assert!(matches!(err, SymbolError::InvalidCharacters(_)));
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn test_symbol_display() {
        let symbol = Symbol::new("qqq").unwrap();
        assert_eq!(format!("{}", symbol), "QQQ");
    }
}
