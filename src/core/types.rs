use serde::{Deserialize, Serialize};

/// How consecutive levels are turned into returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnsType {
    #[default]
    Simple,
    Logarithmic,
    Absolute,
}

/// Anchor of a generated series relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    StartToday,
    EndToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagMode {
    /// Keep the original date range, dropping values shifted outside it.
    #[default]
    Truncate,
    /// Add new dates so that no value is dropped.
    Extend,
}

/// Whether inputs are price levels or already returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesType {
    #[default]
    Prices,
    Returns,
}
