use crate::models::{PricePoint, PriceSeries};

/// Denominators with a smaller magnitude than this produce an undefined point
pub const MIN_DENOMINATOR: f64 = 1e-12;

/// Elementwise ratio `a / b`, paired by position.
///
/// Timestamps come from `a`. Either side empty gives an empty series; a
/// zero, near-zero or non-finite denominator gives `NaN` for that point.
pub fn combine_ratio(a: &PriceSeries, b: &PriceSeries) -> PriceSeries {
    if a.is_empty() || b.is_empty() {
        return PriceSeries::empty();
    }

    let points = a
        .iter()
        .zip(b.iter())
        .map(|(numerator, denominator)| {
            PricePoint::new(numerator.timestamp, ratio(numerator.price, denominator.price))
        })
        .collect();

    PriceSeries::new(points)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator.abs() < MIN_DENOMINATOR {
        return f64::NAN;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn series(start: DateTime<Utc>, prices: Vec<f64>) -> PriceSeries {
        let timestamps = (0..prices.len())
            .map(|i| start + Duration::hours(i as i64))
            .collect();
        PriceSeries::from_parts(timestamps, prices)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_inputs() {
        let some = series(start(), vec![1.0, 2.0]);

        assert!(combine_ratio(&PriceSeries::empty(), &PriceSeries::empty()).is_empty());
        assert!(combine_ratio(&some, &PriceSeries::empty()).is_empty());
        assert!(combine_ratio(&PriceSeries::empty(), &some).is_empty());
    }

    #[test]
    fn test_truncates_to_shorter_series() {
        let a = series(start(), (1..=100).map(|i| i as f64 * 10.0).collect());
        // Offset timestamps: pairing is positional, not by time
        let b = series(start() + Duration::minutes(7), (1..=80).map(|i| i as f64).collect());

        let result = combine_ratio(&a, &b);

        assert_eq!(result.len(), 80);
        for (i, point) in result.iter().enumerate() {
            assert_eq!(point.timestamp, a.points()[i].timestamp);
            assert_eq!(point.price, a.points()[i].price / b.points()[i].price);
        }
    }

    #[test]
    fn test_zero_denominator_is_undefined() {
        let a = series(start(), vec![10.0, 10.0, 10.0, 10.0]);
        let b = series(start(), vec![2.0, 0.0, 1e-15, f64::INFINITY]);

        let result = combine_ratio(&a, &b);

        assert_eq!(result.len(), 4);
        assert_eq!(result.points()[0].price, 5.0);
        assert!(result.points()[1].price.is_nan());
        assert!(result.points()[2].price.is_nan());
        assert!(result.points()[3].price.is_nan());
    }
}
