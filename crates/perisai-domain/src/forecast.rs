use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::tenant::RiskUser;

/// Forecast direction label shown on a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForecastDirection {
    #[serde(rename = "Akan Meningkat")]
    AkanMeningkat,
    #[serde(rename = "Akan Menurun")]
    AkanMenurun,
    #[serde(rename = "unavailable")]
    Unavailable,
}

impl std::fmt::Display for ForecastDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastDirection::AkanMeningkat => write!(f, "Akan Meningkat"),
            ForecastDirection::AkanMenurun => write!(f, "Akan Menurun"),
            ForecastDirection::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub year: String,
    pub value: f64,
}

/// Actual/forecast series pair returned by the external forecast service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForecastSeries {
    #[serde(default)]
    pub actual_data: Vec<SeriesPoint>,
    #[serde(default)]
    pub forecast_data: Vec<SeriesPoint>,
}

/// One forecast lookup: which model endpoint to query and which
/// industry/supplier/retail code identifies the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub endpoint: String,
    pub user: RiskUser,
    pub code: String,
}

/// External forecast service. Infrastructure (perisai-forecast) implements
/// this trait over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_forecast(&self, request: &ForecastRequest) -> DomainResult<ForecastSeries>;
}

/// Compare the last actual value against the first forecast value. A
/// missing side of the payload yields Unavailable rather than an error.
pub fn forecast_prediction(series: &ForecastSeries) -> ForecastDirection {
    match (series.actual_data.last(), series.forecast_data.first()) {
        (Some(actual), Some(forecast)) => {
            if actual.value < forecast.value {
                ForecastDirection::AkanMeningkat
            } else {
                ForecastDirection::AkanMenurun
            }
        }
        _ => ForecastDirection::Unavailable,
    }
}
