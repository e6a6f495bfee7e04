use serde::{Serialize, Serializer};

use crate::trend::RatePoint;

/// Rates at or above this are high priority ("Tinggi").
pub const PRIORITY_HIGH_THRESHOLD: f64 = 71.0;
/// Rates at or above this (and below the high threshold) are medium
/// priority ("Sedang").
pub const PRIORITY_MEDIUM_THRESHOLD: f64 = 36.0;
/// How many of the most recent periods feed priority and effectivity.
pub const RECENT_PERIOD_WINDOW: usize = 5;

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `numerator` over `denominator`. A zero denominator is an
/// empty observation set and yields 0.0, never NaN or an error.
pub fn rate_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        round2(numerator / denominator * 100.0)
    }
}

/// Risk priority tier of a scalar rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Tinggi,
    Sedang,
    Rendah,
    #[serde(rename = "unavailable")]
    Unavailable,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Tinggi => write!(f, "Tinggi"),
            Priority::Sedang => write!(f, "Sedang"),
            Priority::Rendah => write!(f, "Rendah"),
            Priority::Unavailable => write!(f, "unavailable"),
        }
    }
}

pub fn priority_of(rate: Option<f64>) -> Priority {
    match rate {
        None => Priority::Unavailable,
        Some(rate) if rate >= PRIORITY_HIGH_THRESHOLD => Priority::Tinggi,
        Some(rate) if rate >= PRIORITY_MEDIUM_THRESHOLD => Priority::Sedang,
        Some(_) => Priority::Rendah,
    }
}

/// Year-over-year percentage decline. No decline (or nothing to decline
/// from) is 0.
pub fn decline_rate(current: f64, previous: f64) -> f64 {
    if previous <= 0.0 || current >= previous {
        0.0
    } else {
        round2((previous - current) / previous * 100.0)
    }
}

/// Year-over-year percentage growth, the symmetric case of
/// [`decline_rate`].
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous <= 0.0 || current <= previous {
        0.0
    } else {
        round2((current - previous) / previous * 100.0)
    }
}

/// Year-over-year improvement of a risk rate, the proxy for whether the
/// stated mitigation is working.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effectivity {
    Value(f64),
    InsufficientData,
}

impl Serialize for Effectivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Effectivity::Value(v) => serializer.serialize_f64(*v),
            Effectivity::InsufficientData => serializer.serialize_str("insufficient data"),
        }
    }
}

/// Compare the two most recent points of a rate series. Requires at least
/// two observed periods.
pub fn mitigation_effectivity(series: &[RatePoint]) -> Effectivity {
    let mut ordered: Vec<&RatePoint> = series.iter().collect();
    ordered.sort_by(|a, b| b.period.cmp(&a.period));

    match (ordered.first(), ordered.get(1)) {
        (Some(current), Some(previous)) => {
            Effectivity::Value(decline_rate(current.rate, previous.rate))
        }
        _ => Effectivity::InsufficientData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(period: &str, rate: f64) -> RatePoint {
        RatePoint {
            period: period.to_string(),
            rate,
        }
    }

    #[test]
    fn test_rate_of_zero_denominator() {
        assert_eq!(rate_of(0.0, 0.0), 0.0);
        assert_eq!(rate_of(17.0, 0.0), 0.0);
    }

    #[test]
    fn test_rate_of_bounds() {
        assert_eq!(rate_of(1.0, 3.0), 33.33);
        assert_eq!(rate_of(3.0, 3.0), 100.0);
        assert_eq!(rate_of(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_priority_boundaries() {
        assert_eq!(priority_of(Some(70.99)), Priority::Sedang);
        assert_eq!(priority_of(Some(71.00)), Priority::Tinggi);
        assert_eq!(priority_of(Some(35.99)), Priority::Rendah);
        assert_eq!(priority_of(Some(36.00)), Priority::Sedang);
        assert_eq!(priority_of(None), Priority::Unavailable);
    }

    #[test]
    fn test_priority_serializes_to_contract_labels() {
        assert_eq!(
            serde_json::to_value(Priority::Tinggi).unwrap(),
            serde_json::json!("Tinggi")
        );
        assert_eq!(
            serde_json::to_value(Priority::Unavailable).unwrap(),
            serde_json::json!("unavailable")
        );
    }

    #[test]
    fn test_decline_rate() {
        assert_eq!(decline_rate(30.0, 50.0), 40.0);
        assert_eq!(decline_rate(50.0, 30.0), 0.0);
        assert_eq!(decline_rate(10.0, 0.0), 0.0);
        assert_eq!(decline_rate(10.0, -5.0), 0.0);
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(50.0, 30.0), 66.67);
        assert_eq!(growth_rate(30.0, 50.0), 0.0);
        assert_eq!(growth_rate(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_effectivity_declining_rate() {
        let series = vec![point("2023", 50.0), point("2024", 30.0)];
        assert_eq!(mitigation_effectivity(&series), Effectivity::Value(40.0));
    }

    #[test]
    fn test_effectivity_worsening_rate_is_zero() {
        let series = vec![point("2023", 30.0), point("2024", 50.0)];
        assert_eq!(mitigation_effectivity(&series), Effectivity::Value(0.0));
    }

    #[test]
    fn test_effectivity_order_independent() {
        let series = vec![point("2024", 30.0), point("2022", 80.0), point("2023", 50.0)];
        // Most recent pair is (2024: 30, 2023: 50) regardless of input order.
        assert_eq!(mitigation_effectivity(&series), Effectivity::Value(40.0));
    }

    #[test]
    fn test_effectivity_insufficient_data() {
        assert_eq!(
            mitigation_effectivity(&[point("2024", 10.0)]),
            Effectivity::InsufficientData
        );
        assert_eq!(mitigation_effectivity(&[]), Effectivity::InsufficientData);
    }

    #[test]
    fn test_effectivity_serialization() {
        assert_eq!(
            serde_json::to_value(Effectivity::Value(40.0)).unwrap(),
            serde_json::json!(40.0)
        );
        assert_eq!(
            serde_json::to_value(Effectivity::InsufficientData).unwrap(),
            serde_json::json!("insufficient data")
        );
    }
}
