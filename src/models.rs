use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Simulation parameters for a single asset
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssetProfile {
    pub symbol: String,
    pub current_price: f64,
    pub volatility: f64,
    pub mean_reversion_rate: f64,
}

impl AssetProfile {
    pub fn new(
        symbol: impl Into<String>,
        current_price: f64,
        volatility: f64,
        mean_reversion_rate: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            volatility,
            mean_reversion_rate,
        }
    }

    /// Profile used for any symbol missing from the profile table
    pub fn fallback() -> Self {
        Self::new("DEFAULT", 100.0, 0.01, 0.01)
    }

    /// Lowest price a generated path may reach (10% of the anchor)
    pub fn lower_bound(&self) -> f64 {
        0.1 * self.current_price
    }

    /// Highest price a generated path may reach (10x the anchor)
    pub fn upper_bound(&self) -> f64 {
        10.0 * self.current_price
    }

    pub fn clamp(&self, price: f64) -> f64 {
        price.clamp(self.lower_bound(), self.upper_bound())
    }
}

/// Chart timeframe offered by the dashboard
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "2w")]
    TwoWeeks,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1yr")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::ThreeDays,
        Timeframe::TwoWeeks,
        Timeframe::ThreeMonths,
        Timeframe::OneYear,
        Timeframe::FiveYears,
        Timeframe::TenYears,
    ];

    /// Resolve a UI token, falling back to `3d` for anything unrecognised
    pub fn resolve(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    pub fn token(&self) -> &'static str {
        match self {
            Timeframe::ThreeDays => "3d",
            Timeframe::TwoWeeks => "2w",
            Timeframe::ThreeMonths => "3m",
            Timeframe::OneYear => "1yr",
            Timeframe::FiveYears => "5y",
            Timeframe::TenYears => "10y",
        }
    }

    pub fn spec(&self) -> TimeframeSpec {
        match self {
            Timeframe::ThreeDays => TimeframeSpec::new(Duration::days(3), Duration::minutes(15)),
            Timeframe::TwoWeeks => TimeframeSpec::new(Duration::days(14), Duration::hours(1)),
            Timeframe::ThreeMonths => TimeframeSpec::new(Duration::days(90), Duration::days(1)),
            Timeframe::OneYear => TimeframeSpec::new(Duration::days(365), Duration::days(1)),
            Timeframe::FiveYears => TimeframeSpec::new(Duration::days(5 * 365), Duration::weeks(1)),
            Timeframe::TenYears => TimeframeSpec::new(Duration::days(10 * 365), Duration::weeks(1)),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.token() == s)
            .ok_or_else(|| format!("Unknown timeframe: {}", s))
    }
}

/// Window and sampling resolution behind a timeframe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeframeSpec {
    pub lookback_duration: Duration,
    pub sample_interval: Duration,
}

/// Points substituted when the window and interval produce no samples
pub const FALLBACK_SAMPLES: usize = 24;

impl TimeframeSpec {
    pub fn new(lookback_duration: Duration, sample_interval: Duration) -> Self {
        Self {
            lookback_duration,
            sample_interval,
        }
    }

    /// Number of samples implied by the window, zero when the interval is degenerate
    pub fn sample_count(&self) -> usize {
        let interval_ms = self.sample_interval.num_milliseconds();
        let lookback_ms = self.lookback_duration.num_milliseconds();
        if interval_ms <= 0 || lookback_ms <= 0 {
            return 0;
        }
        (lookback_ms / interval_ms) as usize
    }

    /// Sample timestamps for the window ending at `now`.
    ///
    /// The last sample sits on `now` and earlier samples step back by
    /// `sample_interval`. A degenerate window yields 24 hourly points from
    /// the window start instead.
    pub fn timestamps(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let count = self.sample_count();

        if count == 0 {
            let start = now - self.lookback_duration.max(Duration::zero());
            return (0..FALLBACK_SAMPLES)
                .map(|i| start + Duration::hours(i as i64))
                .collect();
        }

        (0..count)
            .map(|i| now - self.sample_interval * (count - 1 - i) as i32)
            .collect()
    }
}

/// A single observation on a chart
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    /// Undefined ratio points serialize as `null` and read back as `NaN`
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
}

fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Ordered price observations with strictly increasing timestamps
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair timestamps with prices, truncating to the shorter of the two
    pub fn from_parts(timestamps: Vec<DateTime<Utc>>, prices: Vec<f64>) -> Self {
        let points = timestamps
            .into_iter()
            .zip(prices)
            .map(|(timestamp, price)| PricePoint::new(timestamp, price))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last().map(|p| p.price)
    }

    pub fn min_price(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.price)
            .filter(|p| !p.is_nan())
            .fold(None, |acc, p| Some(acc.map_or(p, |m: f64| m.min(p))))
    }

    pub fn max_price(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.price)
            .filter(|p| !p.is_nan())
            .fold(None, |acc, p| Some(acc.map_or(p, |m: f64| m.max(p))))
    }

    /// Time covered between the first and last observation
    pub fn span(&self) -> Option<Duration> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(last.timestamp - first.timestamp),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Rendered state of one dashboard panel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub id: String,
    pub title: String,
    pub color: String,
    pub series: PriceSeries,
    /// Last-price annotation, absent when the series is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_label: Option<String>,
}

pub const EMPTY_STATE_TEXT: &str = "No data available";

impl ChartSnapshot {
    pub fn display_label(&self) -> &str {
        self.last_label.as_deref().unwrap_or(EMPTY_STATE_TEXT)
    }
}

/// All panels produced by one refresh cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub charts: Vec<ChartSnapshot>,
}

impl DashboardSnapshot {
    pub fn chart(&self, id: &str) -> Option<&ChartSnapshot> {
        self.charts.iter().find(|c| c.id == id)
    }

    pub fn format_report(&self) -> String {
        let border = "═".repeat(62);
        let mut report = String::new();

        report.push_str(&format!("\n╔{}╗\n", border));
        report.push_str(&format!(
            "║ {:<60} ║\n",
            format!("SYNTHETIC MARKET DASHBOARD ({})", self.timeframe)
        ));
        report.push_str(&format!(
            "║ {:<60} ║\n",
            format!("Last Updated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))
        ));
        report.push_str(&format!("╠{}╣\n", border));
        report.push_str(&format!("║ {:<28} {:>8} {:>22} ║\n", "Chart", "Points", "Last"));
        report.push_str(&format!("╠{}╣\n", border));

        for chart in &self.charts {
            report.push_str(&format!(
                "║ {:<28} {:>8} {:>22} ║\n",
                truncate(&chart.title, 28),
                chart.series.len(),
                truncate(chart.display_label(), 22),
            ));
        }

        report.push_str(&format!("╚{}╝\n", border));
        report
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width).collect()
    }
}
