use crate::config::Config;
use crate::dashboard::{ChartPanel, PanelSource};
use crate::errors::Result;
use crate::models::{ChartSnapshot, DashboardSnapshot, PriceSeries, Timeframe};
use crate::simulation::{combine_ratio, PathGenerator, ProfileTable};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Panels plus the generator that feeds them
pub struct Dashboard {
    generator: PathGenerator,
    panels: Vec<ChartPanel>,
    timeframe: String,
}

impl Dashboard {
    pub fn new(generator: PathGenerator, panels: Vec<ChartPanel>, timeframe: &str) -> Self {
        Self {
            generator,
            panels,
            timeframe: timeframe.to_string(),
        }
    }

    /// Build from configuration; `seed` takes priority over the configured one
    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self> {
        let profiles = ProfileTable::from_assets(&config.assets)?;
        let generator = match seed.or(config.seed()?) {
            Some(seed) => {
                info!("Using fixed seed {}", seed);
                PathGenerator::with_seed(profiles, seed)
            }
            None => PathGenerator::new(profiles),
        };

        Ok(Self::new(
            generator,
            config.panels()?,
            &config.general.default_timeframe,
        ))
    }

    pub fn panels(&self) -> &[ChartPanel] {
        &self.panels
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    /// Switch the active timeframe; unknown tokens render as `3d`
    pub fn select_timeframe(&mut self, token: &str) {
        if token.parse::<Timeframe>().is_err() {
            debug!("Unknown timeframe '{}', charts will use 3d", token);
        }
        self.timeframe = token.to_string();
    }

    pub fn refresh(&mut self) -> DashboardSnapshot {
        self.refresh_at(Utc::now())
    }

    /// Regenerate every panel for the window ending at `now`.
    ///
    /// Each symbol is simulated once per refresh so ratio panels agree with
    /// the asset panels drawn beside them.
    pub fn refresh_at(&mut self, now: DateTime<Utc>) -> DashboardSnapshot {
        let mut paths: HashMap<String, PriceSeries> = HashMap::new();
        for panel in &self.panels {
            for symbol in panel.symbols() {
                if !paths.contains_key(symbol) {
                    let series = self.generator.generate_at(symbol, &self.timeframe, now);
                    paths.insert(symbol.to_string(), series);
                }
            }
        }

        let charts = self
            .panels
            .iter()
            .map(|panel| {
                let series = match &panel.source {
                    PanelSource::Asset { symbol } => {
                        paths.get(symbol).cloned().unwrap_or_default()
                    }
                    PanelSource::Ratio {
                        numerator,
                        denominator,
                    } => match (paths.get(numerator), paths.get(denominator)) {
                        (Some(a), Some(b)) => combine_ratio(a, b),
                        _ => PriceSeries::empty(),
                    },
                };

                let last_label = series.last_price().map(|p| panel.last_price_label(p));
                ChartSnapshot {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    color: panel.color.clone(),
                    series,
                    last_label,
                }
            })
            .collect();

        DashboardSnapshot {
            generated_at: now,
            timeframe: Timeframe::resolve(&self.timeframe),
            charts,
        }
    }
}

/// Outcome of the most recent refresh cycle
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshStatus {
    Pending,
    Updated(DateTime<Utc>),
    Failed(String),
}

impl std::fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStatus::Pending => write!(f, "Pending"),
            RefreshStatus::Updated(at) => write!(f, "Updated {}", at.format("%H:%M:%S")),
            RefreshStatus::Failed(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Periodic refresh driver for watch mode
pub struct RefreshLoop {
    dashboard: Dashboard,
    interval: Duration,
    output: Option<PathBuf>,
    max_ticks: Option<u64>,
    status: RefreshStatus,
}

impl RefreshLoop {
    pub fn new(dashboard: Dashboard, interval: Duration) -> Self {
        Self {
            dashboard,
            interval,
            output: None,
            max_ticks: None,
            status: RefreshStatus::Pending,
        }
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn status(&self) -> &RefreshStatus {
        &self.status
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    /// Refresh on every tick until the tick limit (if any) is reached.
    ///
    /// A failed cycle is recorded in the status and the loop keeps going.
    /// Returns the number of completed cycles.
    pub async fn run<F>(&mut self, mut on_snapshot: F) -> Result<u64>
    where
        F: FnMut(&DashboardSnapshot) -> Result<()>,
    {
        info!(
            "Refreshing {} charts every {:?}",
            self.dashboard.panels().len(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        let mut ticks = 0u64;

        loop {
            if let Some(max) = self.max_ticks {
                if ticks >= max {
                    break;
                }
            }

            ticker.tick().await;
            self.status = match self.cycle(&mut on_snapshot) {
                Ok(at) => RefreshStatus::Updated(at),
                Err(e) => {
                    error!("Refresh failed: {}", e);
                    RefreshStatus::Failed(e.to_string())
                }
            };
            ticks += 1;
            debug!("Refresh {} status: {}", ticks, self.status);
        }

        Ok(ticks)
    }

    /// One refresh: regenerate, hand to the consumer, persist the latest snapshot
    fn cycle<F>(&mut self, on_snapshot: &mut F) -> Result<DateTime<Utc>>
    where
        F: FnMut(&DashboardSnapshot) -> Result<()>,
    {
        let snapshot = self.dashboard.refresh();
        on_snapshot(&snapshot)?;

        if let Some(path) = &self.output {
            write_snapshot(path, &snapshot)?;
        }

        Ok(snapshot.generated_at)
    }
}

/// Write a snapshot as pretty-printed JSON
pub fn write_snapshot(path: &Path, snapshot: &DashboardSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DashboardError;
    use crate::models::EMPTY_STATE_TEXT;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 25, 15, 34, 0).unwrap()
    }

    fn seeded_dashboard() -> Dashboard {
        Dashboard::from_config(&Config::default(), Some(17)).unwrap()
    }

    #[test]
    fn test_refresh_builds_every_panel() {
        let mut dashboard = seeded_dashboard();
        let snapshot = dashboard.refresh_at(fixed_now());

        assert_eq!(snapshot.charts.len(), 8);
        assert_eq!(snapshot.timeframe, Timeframe::ThreeDays);
        for chart in &snapshot.charts {
            assert_eq!(chart.series.len(), 288);
            assert!(chart.last_label.is_some());
        }

        let gold = snapshot.chart("gold").unwrap();
        assert!(gold.display_label().starts_with('$'));
        let ratio = snapshot.chart("gold-silver-ratio").unwrap();
        assert!(!ratio.display_label().starts_with('$'));
    }

    #[test]
    fn test_ratio_panel_matches_asset_panels() {
        let mut dashboard = seeded_dashboard();
        let snapshot = dashboard.refresh_at(fixed_now());

        let gold = &snapshot.chart("gold").unwrap().series;
        let silver = &snapshot.chart("silver").unwrap().series;
        let ratio = &snapshot.chart("gold-silver-ratio").unwrap().series;

        for (i, point) in ratio.iter().enumerate() {
            assert_eq!(point.timestamp, gold.points()[i].timestamp);
            assert_eq!(point.price, gold.points()[i].price / silver.points()[i].price);
        }
    }

    #[test]
    fn test_select_timeframe() {
        let mut dashboard = seeded_dashboard();

        dashboard.select_timeframe("1yr");
        let snapshot = dashboard.refresh_at(fixed_now());
        assert_eq!(snapshot.timeframe, Timeframe::OneYear);
        assert_eq!(snapshot.chart("xrp").unwrap().series.len(), 365);

        dashboard.select_timeframe("bogus");
        assert_eq!(dashboard.timeframe(), "bogus");
        let snapshot = dashboard.refresh_at(fixed_now());
        assert_eq!(snapshot.timeframe, Timeframe::ThreeDays);
        assert_eq!(snapshot.chart("xrp").unwrap().series.len(), 288);
    }

    #[test]
    fn test_unknown_asset_panel_uses_default_profile() {
        let panels = vec![ChartPanel::asset("mystery", "Mystery", "#000000", "Mystery")];
        let generator = PathGenerator::with_seed(ProfileTable::new(), 8);
        let mut dashboard = Dashboard::new(generator, panels, "2w");

        let snapshot = dashboard.refresh_at(fixed_now());
        let chart = snapshot.chart("mystery").unwrap();
        assert_eq!(chart.series.len(), 336);
        assert!(chart.series.min_price().unwrap() >= 10.0);
        assert!(chart.series.max_price().unwrap() <= 1000.0);
    }

    #[test]
    fn test_empty_snapshot_label() {
        let chart = ChartSnapshot {
            id: "none".to_string(),
            title: "None".to_string(),
            color: "#000000".to_string(),
            series: PriceSeries::empty(),
            last_label: None,
        };
        assert_eq!(chart.display_label(), EMPTY_STATE_TEXT);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            RefreshStatus::Failed("boom".to_string()).to_string(),
            "Error: boom"
        );
        assert_eq!(RefreshStatus::Pending.to_string(), "Pending");
    }

    #[tokio::test]
    async fn test_refresh_loop_stops_after_ticks() {
        let mut refresh_loop =
            RefreshLoop::new(seeded_dashboard(), Duration::from_millis(5)).with_max_ticks(3);

        let mut seen = 0;
        let ticks = refresh_loop
            .run(|snapshot| {
                assert_eq!(snapshot.charts.len(), 8);
                seen += 1;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(seen, 3);
        assert!(matches!(refresh_loop.status(), RefreshStatus::Updated(_)));
    }

    #[tokio::test]
    async fn test_refresh_loop_survives_failures() {
        let mut refresh_loop =
            RefreshLoop::new(seeded_dashboard(), Duration::from_millis(5)).with_max_ticks(2);

        let ticks = refresh_loop
            .run(|_| Err(DashboardError::Unknown("chart backend down".to_string())))
            .await
            .unwrap();

        assert_eq!(ticks, 2);
        assert_eq!(
            refresh_loop.status().to_string(),
            "Error: Unknown error: chart backend down"
        );
    }

    #[tokio::test]
    async fn test_refresh_loop_writes_output() {
        let path = std::env::temp_dir().join("synthetic_dashboard_snapshot_test.json");
        let _ = std::fs::remove_file(&path);

        let mut refresh_loop = RefreshLoop::new(seeded_dashboard(), Duration::from_millis(5))
            .with_output(path.clone())
            .with_max_ticks(1);
        refresh_loop.dashboard_mut().select_timeframe("5y");
        refresh_loop.run(|_| Ok(())).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let snapshot: DashboardSnapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(snapshot.timeframe, Timeframe::FiveYears);
        assert_eq!(snapshot.charts.len(), 8);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_undefined_ratio_point_survives_output_file() {
        let now = fixed_now();
        let timestamps = vec![now, now + chrono::Duration::hours(1)];
        let numerator = PriceSeries::from_parts(timestamps.clone(), vec![10.0, 12.0]);
        let denominator = PriceSeries::from_parts(timestamps, vec![0.0, 4.0]);
        let ratio = combine_ratio(&numerator, &denominator);

        let snapshot = DashboardSnapshot {
            generated_at: now,
            timeframe: Timeframe::ThreeDays,
            charts: vec![ChartSnapshot {
                id: "ratio".to_string(),
                title: "Ratio".to_string(),
                color: "#8A2BE2".to_string(),
                series: ratio,
                last_label: Some("3.00".to_string()),
            }],
        };

        let path = std::env::temp_dir().join("synthetic_dashboard_nan_ratio_test.json");
        write_snapshot(&path, &snapshot).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(written.contains("null"));
        let restored: DashboardSnapshot = serde_json::from_str(&written).unwrap();
        let points = restored.chart("ratio").unwrap().series.points();
        assert_eq!(points.len(), 2);
        assert!(points[0].price.is_nan());
        assert_eq!(points[1].price, 3.0);
        assert_eq!(points[0].timestamp, now);
    }
}
