use crate::models::{AssetProfile, PriceSeries, Timeframe, TimeframeSpec};
use crate::simulation::profiles::ProfileTable;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

/// Mean-reverting random walk anchored to each asset's current price.
///
/// Every call regenerates the path from scratch: timestamps are derived from
/// the timeframe alone, prices from fresh draws of the owned random source.
pub struct PathGenerator<R = StdRng> {
    profiles: ProfileTable,
    rng: R,
}

impl PathGenerator<StdRng> {
    /// Generator seeded from OS entropy
    pub fn new(profiles: ProfileTable) -> Self {
        Self::from_rng(profiles, StdRng::from_entropy())
    }

    /// Generator with a fixed seed for reproducible paths
    pub fn with_seed(profiles: ProfileTable, seed: u64) -> Self {
        Self::from_rng(profiles, StdRng::seed_from_u64(seed))
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: Rng> PathGenerator<R> {
    pub fn from_rng(profiles: ProfileTable, rng: R) -> Self {
        Self { profiles, rng }
    }

    /// Generate a path for `symbol` over the window named by `timeframe`, ending now
    pub fn generate(&mut self, symbol: &str, timeframe: &str) -> PriceSeries {
        self.generate_at(symbol, timeframe, Utc::now())
    }

    /// Same as [`generate`](Self::generate) with an explicit end of window
    pub fn generate_at(&mut self, symbol: &str, timeframe: &str, now: DateTime<Utc>) -> PriceSeries {
        let profile = self.profiles.resolve(symbol).clone();
        let spec = Timeframe::resolve(timeframe).spec();

        let series = self.generate_series(&profile, &spec, now);
        debug!(
            "Generated {} points for {} ({} -> {})",
            series.len(),
            symbol,
            timeframe,
            profile.symbol
        );
        series
    }

    pub fn generate_series(
        &mut self,
        profile: &AssetProfile,
        spec: &TimeframeSpec,
        now: DateTime<Utc>,
    ) -> PriceSeries {
        let timestamps = spec.timestamps(now);
        let prices = self.simulate_prices(profile, timestamps.len());
        PriceSeries::from_parts(timestamps, prices)
    }

    /// Walk `steps` prices for the profile
    fn simulate_prices(&mut self, profile: &AssetProfile, steps: usize) -> Vec<f64> {
        let anchor = profile.current_price;
        let mut prices = Vec::with_capacity(steps);
        if steps == 0 {
            return prices;
        }

        // Start within 5% of the anchor
        let first = anchor * self.rng.gen_range(0.95..=1.05);
        prices.push(profile.clamp(first));

        for i in 1..steps {
            let previous = prices[i - 1];
            let reversion = profile.mean_reversion_rate * (anchor - previous) / anchor;
            let z: f64 = self.rng.sample(StandardNormal);
            let noise = profile.volatility * z;

            let next = previous * (1.0 + reversion + noise);
            prices.push(profile.clamp(next));
        }

        // Land near the anchor so the chart meets the quoted price
        if let Some(last) = prices.last_mut() {
            *last = anchor * self.rng.gen_range(0.98..=1.02);
        }

        prices
    }
}
