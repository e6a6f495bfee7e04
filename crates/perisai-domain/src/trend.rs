use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::rate::rate_of;
use crate::records::{
    HistoryShipment, InspectionProduct, LetterOfAgreement, ProductionRequest, Receive, Rfq,
    Transfer,
};

/// One classified increment: how much of a record (or detail row) counts
/// toward the favorable vs the adverse side of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outcome {
    pub conforming: f64,
    pub nonconforming: f64,
}

impl Outcome {
    /// A settled-but-empty observation. Keeps the period bucket alive
    /// without moving the rate.
    pub const ZERO: Outcome = Outcome {
        conforming: 0.0,
        nonconforming: 0.0,
    };

    pub fn new(conforming: f64, nonconforming: f64) -> Self {
        Self {
            conforming,
            nonconforming,
        }
    }
}

/// One (period, metric-pair) observation of a trend series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub period: String,
    pub conforming: f64,
    pub nonconforming: f64,
}

/// One (period, percentage) observation derived from a `TrendPoint`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatePoint {
    pub period: String,
    pub rate: f64,
}

/// Group records by calendar year of their bucketing date and accumulate
/// classified outcomes. A record creates its bucket even when every one of
/// its outcomes is zero (bucket presence depends only on the timestamp).
/// Output is ordered ascending by year.
pub fn aggregate_yearly<R>(
    records: &[R],
    period: impl Fn(&R) -> NaiveDate,
    classify: impl Fn(&R) -> Vec<Outcome>,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<i32, Outcome> = BTreeMap::new();

    for record in records {
        let bucket = buckets.entry(period(record).year()).or_default();
        for outcome in classify(record) {
            bucket.conforming += outcome.conforming;
            bucket.nonconforming += outcome.nonconforming;
        }
    }

    buckets
        .into_iter()
        .map(|(year, outcome)| TrendPoint {
            period: year.to_string(),
            conforming: outcome.conforming,
            nonconforming: outcome.nonconforming,
        })
        .collect()
}

/// Like [`aggregate_yearly`] but bucketed by calendar month, labelled
/// `"%b %Y"` (e.g. "Jan 2024"), in chronological order.
pub fn aggregate_monthly<R>(
    records: &[R],
    period: impl Fn(&R) -> NaiveDate,
    classify: impl Fn(&R) -> Vec<Outcome>,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (String, Outcome)> = BTreeMap::new();

    for record in records {
        let date = period(record);
        let bucket = buckets
            .entry((date.year(), date.month()))
            .or_insert_with(|| (date.format("%b %Y").to_string(), Outcome::ZERO));
        for outcome in classify(record) {
            bucket.1.conforming += outcome.conforming;
            bucket.1.nonconforming += outcome.nonconforming;
        }
    }

    buckets
        .into_values()
        .map(|(label, outcome)| TrendPoint {
            period: label,
            conforming: outcome.conforming,
            nonconforming: outcome.nonconforming,
        })
        .collect()
}

/// The `n` most recent periods of a yearly series, in ascending order:
/// sort descending, keep the head, reverse. Never returns more than `n`
/// points.
pub fn recent_window(mut series: Vec<TrendPoint>, n: usize) -> Vec<TrendPoint> {
    series.sort_by(|a, b| b.period.cmp(&a.period));
    series.truncate(n);
    series.reverse();
    series
}

/// Per-period risk rate: the adverse share of each bucket as a percentage.
pub fn rate_series(series: &[TrendPoint]) -> Vec<RatePoint> {
    series
        .iter()
        .map(|point| RatePoint {
            period: point.period.clone(),
            rate: rate_of(point.nonconforming, point.conforming + point.nonconforming),
        })
        .collect()
}

// Per-domain bucketing dates and outcome classifiers. Records whose outcome
// has not settled yet (in transit, unanswered, still open) classify as a
// zero pair so the bucket exists without moving the rate.

pub fn receive_period(r: &Receive) -> NaiveDate {
    r.received_date
}

/// A receipt fans out to one outcome per detail row.
pub fn classify_receive(r: &Receive) -> Vec<Outcome> {
    r.details
        .iter()
        .map(|d| Outcome::new(d.accepted_quantity, d.rejected_quantity))
        .collect()
}

pub fn transfer_period(t: &Transfer) -> NaiveDate {
    t.target_deadline_date
}

pub fn classify_transfer(t: &Transfer) -> Vec<Outcome> {
    let outcome = match t.received_date {
        Some(received) if received <= t.target_deadline_date => Outcome::new(1.0, 0.0),
        Some(_) => Outcome::new(0.0, 1.0),
        None => Outcome::ZERO,
    };
    vec![outcome]
}

pub fn production_period(p: &ProductionRequest) -> NaiveDate {
    p.target_finish_date
}

pub fn classify_production(p: &ProductionRequest) -> Vec<Outcome> {
    let outcome = match p.finished_date {
        Some(finished) if finished <= p.target_finish_date => Outcome::new(1.0, 0.0),
        Some(_) => Outcome::new(0.0, 1.0),
        None => Outcome::ZERO,
    };
    vec![outcome]
}

pub fn inspection_period(i: &InspectionProduct) -> NaiveDate {
    i.inspection_date
}

pub fn classify_inspection(i: &InspectionProduct) -> Vec<Outcome> {
    vec![Outcome::new(i.passed_quantity, i.failed_quantity)]
}

pub fn rfq_period(r: &Rfq) -> NaiveDate {
    r.response_deadline_date
}

pub fn classify_rfq(r: &Rfq) -> Vec<Outcome> {
    let outcome = match r.responded_date {
        Some(responded) if responded <= r.response_deadline_date => Outcome::new(1.0, 0.0),
        Some(_) => Outcome::new(0.0, 1.0),
        None => Outcome::ZERO,
    };
    vec![outcome]
}

pub fn shipment_period(s: &HistoryShipment) -> NaiveDate {
    s.target_arrival_date
}

pub fn classify_shipment(s: &HistoryShipment) -> Vec<Outcome> {
    let outcome = match s.arrival_date {
        Some(arrived) if arrived <= s.target_arrival_date => Outcome::new(1.0, 0.0),
        Some(_) => Outcome::new(0.0, 1.0),
        None => Outcome::ZERO,
    };
    vec![outcome]
}

pub fn agreement_period(a: &LetterOfAgreement) -> NaiveDate {
    a.effective_date
}

pub fn classify_agreement(a: &LetterOfAgreement) -> Vec<Outcome> {
    let outcome = match a.is_fulfilled {
        Some(true) => Outcome::new(1.0, 0.0),
        Some(false) => Outcome::new(0.0, 1.0),
        None => Outcome::ZERO,
    };
    vec![outcome]
}
