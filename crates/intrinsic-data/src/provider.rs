//! Data-provider capability consumed by the valuation core.
//!
//! The core only needs `fetch_financials`; transport, retries and rate
//! limiting belong to the provider implementation.

use crate::error::{DataError, Result};
use crate::statements::RawStatements;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of raw statement snapshots.
pub trait FinancialsProvider {
    /// Short provider name used in diagnostics.
    fn name(&self) -> &str;

    /// Fetch the statements and market snapshot for a ticker.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] when the ticker cannot be resolved.
    fn fetch_financials(&self, symbol: &str) -> Result<RawStatements>;
}

impl<P: FinancialsProvider + ?Sized> FinancialsProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_financials(&self, symbol: &str) -> Result<RawStatements> {
        (**self).fetch_financials(symbol)
    }
}

fn validate_symbol(symbol: &str) -> Result<&str> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(symbol)
}

/// Provider backed by a map of pre-loaded snapshots.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    statements: HashMap<String, RawStatements>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot under its own symbol, replacing any previous one.
    pub fn insert(&mut self, statements: RawStatements) {
        self.statements
            .insert(statements.symbol.clone(), statements);
    }

    /// Builder-style variant of [`InMemoryProvider::insert`].
    pub fn with(mut self, statements: RawStatements) -> Self {
        self.insert(statements);
        self
    }

    /// Number of registered tickers.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether no tickers are registered.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl FromIterator<RawStatements> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = RawStatements>>(iter: I) -> Self {
        let mut provider = Self::new();
        for statements in iter {
            provider.insert(statements);
        }
        provider
    }
}

impl FinancialsProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_financials(&self, symbol: &str) -> Result<RawStatements> {
        let symbol = validate_symbol(symbol)?;
        self.statements
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::NotFound(symbol.to_string()))
    }
}

/// Provider reading one JSON snapshot per ticker from a directory.
///
/// Snapshots live at `<root>/<SYMBOL>.json` and deserialize into
/// [`RawStatements`].
#[derive(Debug, Clone)]
pub struct JsonDirectoryProvider {
    root: PathBuf,
}

impl JsonDirectoryProvider {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the snapshots are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the snapshot file for a symbol.
    ///
    /// # Errors
    ///
    /// Rejects empty symbols and symbols that would escape the root.
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        let symbol = validate_symbol(symbol)?;
        if symbol.contains(['/', '\\']) || symbol.contains("..") {
            return Err(DataError::InvalidSymbol(symbol.to_string()));
        }
        Ok(self.root.join(format!("{symbol}.json")))
    }

    /// Write a snapshot to `<root>/<SYMBOL>.json`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is invalid or the file cannot be written.
    pub fn save(&self, statements: &RawStatements) -> Result<PathBuf> {
        let path = self.path_for(&statements.symbol)?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, serde_json::to_string_pretty(statements)?)?;
        Ok(path)
    }
}

impl FinancialsProvider for JsonDirectoryProvider {
    fn name(&self) -> &str {
        "json-directory"
    }

    fn fetch_financials(&self, symbol: &str) -> Result<RawStatements> {
        let path = self.path_for(symbol)?;
        if !path.is_file() {
            return Err(DataError::NotFound(symbol.trim().to_string()));
        }

        tracing::debug!(symbol = symbol.trim(), path = %path.display(), "reading statements");
        let content = fs::read_to_string(&path)?;
        let mut statements: RawStatements = serde_json::from_str(&content)?;
        if statements.symbol.trim().is_empty() {
            statements.symbol = symbol.trim().to_string();
        }
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_fetch() {
        let provider = InMemoryProvider::new().with(RawStatements::new("ACME"));

        let raw = provider.fetch_financials("ACME").unwrap();
        assert_eq!(raw.symbol, "ACME");
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_in_memory_not_found() {
        let provider = InMemoryProvider::new();
        let result = provider.fetch_financials("NOPE");
        assert!(matches!(result, Err(DataError::NotFound(ref s)) if s == "NOPE"));
    }

    #[test]
    fn test_invalid_symbol() {
        let provider = InMemoryProvider::new();
        let result = provider.fetch_financials("   ");
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let provider = JsonDirectoryProvider::new("/tmp/statements");
        assert!(provider.path_for("../etc/passwd").is_err());
        assert!(provider.path_for("a/b").is_err());
        assert_eq!(
            provider.path_for("BHP.AX").unwrap(),
            PathBuf::from("/tmp/statements/BHP.AX.json")
        );
    }
}
