use serde::{Deserialize, Serialize};

/// What a panel plots
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PanelSource {
    Asset { symbol: String },
    Ratio { numerator: String, denominator: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartPanel {
    pub id: String,
    pub title: String,
    pub color: String,
    pub source: PanelSource,
}

impl ChartPanel {
    pub fn asset(id: &str, title: &str, color: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            source: PanelSource::Asset {
                symbol: symbol.to_string(),
            },
        }
    }

    pub fn ratio(id: &str, title: &str, color: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
            source: PanelSource::Ratio {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            },
        }
    }

    pub fn is_ratio(&self) -> bool {
        matches!(self.source, PanelSource::Ratio { .. })
    }

    /// Symbols whose paths this panel needs
    pub fn symbols(&self) -> Vec<&str> {
        match &self.source {
            PanelSource::Asset { symbol } => vec![symbol.as_str()],
            PanelSource::Ratio {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }

    /// Annotation text for the last value on this panel
    pub fn last_price_label(&self, value: f64) -> String {
        format_price_label(value, !self.is_ratio())
    }
}

/// Two decimals above 1, four below; `$` prefix for currency-denominated panels
pub fn format_price_label(value: f64, currency: bool) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let prefix = if currency { "$" } else { "" };
    if value > 1.0 {
        format!("{}{:.2}", prefix, value)
    } else {
        format!("{}{:.4}", prefix, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_precision() {
        assert_eq!(format_price_label(3330.0, true), "$3330.00");
        assert_eq!(format_price_label(0.5123456, true), "$0.5123");
        assert_eq!(format_price_label(1.0, true), "$1.0000");
        assert_eq!(format_price_label(92.75, false), "92.75");
        assert_eq!(format_price_label(f64::NAN, true), "n/a");
    }

    #[test]
    fn test_panel_symbols() {
        let gold = ChartPanel::asset("gold", "Gold", "#FFD700", "Gold");
        let ratio = ChartPanel::ratio("gs", "Gold/Silver", "#B87333", "Gold", "Silver");

        assert!(!gold.is_ratio());
        assert!(ratio.is_ratio());
        assert_eq!(gold.symbols(), vec!["Gold"]);
        assert_eq!(ratio.symbols(), vec!["Gold", "Silver"]);
        assert_eq!(ratio.last_price_label(92.5), "92.50");
        assert_eq!(gold.last_price_label(3329.1), "$3329.10");
    }
}
