//! Tax rate configuration.

use serde::{Deserialize, Serialize};

/// One named tax bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRateEntry {
    pub label: String,
    pub percentage: f64,
}

/// Rate table keyed by tax-rate label.
///
/// Line items carry a label string; the table resolves it to a
/// percentage. Unknown labels resolve to 0 so a typo can never tax a
/// line, but it is logged so the typo does not stay silent.
#[derive(Debug, Clone, Default)]
pub struct TaxTable {
    entries: Vec<TaxRateEntry>,
}

impl TaxTable {
    pub fn new(entries: Vec<TaxRateEntry>) -> Self {
        Self { entries }
    }

    pub fn single(label: impl Into<String>, percentage: f64) -> Self {
        Self::new(vec![TaxRateEntry {
            label: label.into(),
            percentage,
        }])
    }

    /// Resolve a label to a percentage. Blank and "Exempt" are
    /// zero-rated by convention; any other unmatched label is
    /// zero-rated with a warning.
    pub fn rate_for(&self, label: &str) -> f64 {
        if let Some(entry) = self.entries.iter().find(|e| e.label == label) {
            return entry.percentage;
        }
        if !label.is_empty() && label != "Exempt" {
            tracing::warn!(tax_rate = %label, "Unknown tax rate label, treating as zero-rated");
        }
        0.0
    }

    pub fn entries(&self) -> &[TaxRateEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_label_resolves() {
        let table = TaxTable::single("Tax on Sales (15%)", 15.0);
        assert_eq!(table.rate_for("Tax on Sales (15%)"), 15.0);
    }

    #[test]
    fn exempt_and_unknown_labels_are_zero_rated() {
        let table = TaxTable::single("Tax on Sales (15%)", 15.0);
        assert_eq!(table.rate_for("Exempt"), 0.0);
        assert_eq!(table.rate_for(""), 0.0);
        assert_eq!(table.rate_for("Tax on Sales (15%) "), 0.0);
    }
}
