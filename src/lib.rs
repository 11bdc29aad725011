pub mod catalog;
pub mod config;
pub mod core;
pub mod econometrics;
pub mod error;
pub mod services;
pub mod statistics;

pub use crate::core::*;
pub use error::{AnalyticsError, Result};
