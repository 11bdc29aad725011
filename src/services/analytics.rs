use crate::config::ServiceConfig;
use crate::{
    econometrics, statistics, AnalyticsError, Direction, LagMode, Lookback, Result, ReturnsType, Series, SeriesType,
    Window,
};
use chrono::{NaiveDate, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn default_initial() -> f64 {
    1.0
}

/// A single function call, tagged by the function's catalog name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum FunctionRequest {
    GenerateSeries {
        length: usize,
        #[serde(default)]
        direction: Direction,
        #[serde(default)]
        seed: Option<u64>,
    },
    Annualize {
        series: Series,
    },
    Lag {
        series: Series,
        #[serde(default)]
        obs: Lookback,
        #[serde(default)]
        mode: LagMode,
    },
    Returns {
        series: Series,
        #[serde(default)]
        obs: Lookback,
        #[serde(default, rename = "type")]
        returns_type: ReturnsType,
    },
    Prices {
        series: Series,
        #[serde(default = "default_initial")]
        initial: f64,
        #[serde(default, rename = "type")]
        returns_type: ReturnsType,
    },
    Diff {
        series: Series,
        #[serde(default)]
        obs: Lookback,
    },
    Index {
        series: Series,
        #[serde(default = "default_initial")]
        initial: f64,
    },
    Volatility {
        series: Series,
        #[serde(default)]
        window: Window,
        #[serde(default, rename = "type")]
        returns_type: ReturnsType,
    },
    Correlation {
        x: Series,
        y: Series,
        #[serde(default)]
        window: Window,
        #[serde(default, rename = "type")]
        series_type: SeriesType,
    },
    Beta {
        x: Series,
        benchmark: Series,
        #[serde(default)]
        window: Window,
        #[serde(default, rename = "type")]
        series_type: SeriesType,
    },
    SharpeRatio {
        series: Series,
        #[serde(default)]
        rate: f64,
        #[serde(default)]
        window: Window,
    },
    MaxDrawdown {
        series: Series,
        #[serde(default)]
        window: Window,
    },
}

impl FunctionRequest {
    pub fn function_name(&self) -> &'static str {
        match self {
            FunctionRequest::GenerateSeries { .. } => "generate_series",
            FunctionRequest::Annualize { .. } => "annualize",
            FunctionRequest::Lag { .. } => "lag",
            FunctionRequest::Returns { .. } => "returns",
            FunctionRequest::Prices { .. } => "prices",
            FunctionRequest::Diff { .. } => "diff",
            FunctionRequest::Index { .. } => "index",
            FunctionRequest::Volatility { .. } => "volatility",
            FunctionRequest::Correlation { .. } => "correlation",
            FunctionRequest::Beta { .. } => "beta",
            FunctionRequest::SharpeRatio { .. } => "sharpe_ratio",
            FunctionRequest::MaxDrawdown { .. } => "max_drawdown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub function: String,
    pub series: Series,
}

pub struct AnalyticsService {
    config: ServiceConfig,
}

impl AnalyticsService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn evaluate(&self, request: FunctionRequest) -> Result<FunctionResponse> {
        let function = request.function_name();

        let result = match request {
            FunctionRequest::GenerateSeries { length, direction, seed } => {
                self.generate_series(length, direction, seed, Utc::now().date_naive())
            }
            FunctionRequest::Annualize { series } => econometrics::annualize(&series),
            FunctionRequest::Lag { series, obs, mode } => econometrics::lag(&series, obs, mode),
            FunctionRequest::Returns { series, obs, returns_type } => econometrics::returns(&series, obs, returns_type),
            FunctionRequest::Prices { series, initial, returns_type } => {
                econometrics::prices(&series, initial, returns_type)
            }
            FunctionRequest::Diff { series, obs } => econometrics::diff(&series, obs),
            FunctionRequest::Index { series, initial } => econometrics::index(&series, initial),
            FunctionRequest::Volatility { series, window, returns_type } => {
                econometrics::volatility(&series, &window, returns_type)
            }
            FunctionRequest::Correlation { x, y, window, series_type } => {
                econometrics::correlation(&x, &y, &window, series_type)
            }
            FunctionRequest::Beta { x, benchmark, window, series_type } => {
                econometrics::beta(&x, &benchmark, &window, series_type)
            }
            FunctionRequest::SharpeRatio { series, rate, window } => econometrics::sharpe_ratio(&series, rate, &window),
            FunctionRequest::MaxDrawdown { series, window } => econometrics::max_drawdown(&series, &window),
        };

        match result {
            Ok(series) => {
                info!(function, points = series.len(), "evaluated function");
                Ok(FunctionResponse {
                    function: function.to_string(),
                    series,
                })
            }
            Err(e) => {
                warn!(function, error = %e, "function evaluation failed");
                Err(e)
            }
        }
    }

    /// Generates a random walk, seeded from the request, the configured default, or entropy.
    pub fn generate_series(
        &self,
        length: usize,
        direction: Direction,
        seed: Option<u64>,
        today: NaiveDate,
    ) -> Result<Series> {
        if length > self.config.max_series_length {
            return Err(AnalyticsError::InvalidData(format!(
                "requested length {} exceeds the limit of {}",
                length, self.config.max_series_length
            )));
        }

        let mut rng = match seed.or(self.config.default_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        statistics::generate_series_with(length, direction, today, &mut rng)
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tags_use_catalog_names() {
        let request: FunctionRequest = serde_json::from_value(serde_json::json!({
            "function": "returns",
            "series": [
                {"date": "2024-01-01", "value": 100.0},
                {"date": "2024-01-02", "value": 110.0}
            ],
            "type": "logarithmic"
        }))
        .unwrap();

        assert_eq!(request.function_name(), "returns");
        let response = AnalyticsService::default().evaluate(request).unwrap();
        assert_eq!(response.series.len(), 1);
        assert!((response.series.values()[0] - 1.1_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn volatility_reads_returns_type_like_returns() {
        let request: FunctionRequest = serde_json::from_value(serde_json::json!({
            "function": "volatility",
            "series": [
                {"date": "2024-01-01", "value": 100.0},
                {"date": "2024-01-02", "value": 110.0},
                {"date": "2024-01-03", "value": 99.0}
            ],
            "window": {"w": 2, "r": 0},
            "type": "logarithmic"
        }))
        .unwrap();

        match &request {
            FunctionRequest::Volatility { returns_type, .. } => assert_eq!(*returns_type, ReturnsType::Logarithmic),
            other => panic!("unexpected request {:?}", other),
        }
        let response = AnalyticsService::default().evaluate(request).unwrap();
        assert_eq!(response.function, "volatility");
        assert_eq!(response.series.len(), 1);
    }

    #[test]
    fn huge_lags_are_rejected_not_fatal() {
        let request: FunctionRequest = serde_json::from_value(serde_json::json!({
            "function": "lag",
            "series": [
                {"date": "2024-01-01", "value": 1.0},
                {"date": "2024-01-02", "value": 2.0}
            ],
            "obs": isize::MAX,
            "mode": "extend"
        }))
        .unwrap();

        let result = AnalyticsService::default().evaluate(request);
        assert!(result.unwrap_err().is_client_error());
    }

    #[test]
    fn rejects_oversized_generation() {
        let service = AnalyticsService::new(ServiceConfig {
            max_series_length: 10,
            ..ServiceConfig::default()
        });
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let result = service.generate_series(11, Direction::StartToday, Some(1), today);
        assert!(matches!(result, Err(AnalyticsError::InvalidData(_))));
    }

    #[test]
    fn configured_seed_makes_generation_repeatable() {
        let service = AnalyticsService::new(ServiceConfig {
            default_seed: Some(99),
            ..ServiceConfig::default()
        });
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let a = service.generate_series(30, Direction::EndToday, None, today).unwrap();
        let b = service.generate_series(30, Direction::EndToday, None, today).unwrap();
        assert_eq!(a, b);
    }
}
