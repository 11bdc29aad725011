use crate::core::window::rolling_apply;
use crate::{AnalyticsError, Direction, Result, Series, Window};
use chrono::{Days, NaiveDate, Utc};
use rand::prelude::*;
use rand_distr::StandardNormal;
use statrs::statistics::Statistics;
use tracing::debug;

/// Starting level of generated series.
pub const GENERATED_SERIES_START: f64 = 100.0;

/// Generates a random walk of `length` daily observations.
///
/// The walk starts at 100 and moves by a standard normal draw each day. With
/// [`Direction::StartToday`] the first date is today, with
/// [`Direction::EndToday`] the last date is today.
pub fn generate_series(length: usize, direction: Direction) -> Result<Series> {
    let mut rng = StdRng::from_entropy();
    generate_series_with(length, direction, Utc::now().date_naive(), &mut rng)
}

/// Deterministic form of [`generate_series`] with an explicit anchor date and generator.
pub fn generate_series_with<R>(length: usize, direction: Direction, today: NaiveDate, rng: &mut R) -> Result<Series>
where
    R: Rng + ?Sized,
{
    if length == 0 {
        return Ok(Series::empty());
    }

    let first = match direction {
        Direction::StartToday => today,
        Direction::EndToday => today
            .checked_sub_days(Days::new(length as u64 - 1))
            .ok_or_else(|| AnalyticsError::InvalidData(format!("{} days before {} is out of range", length, today)))?,
    };

    let mut level = GENERATED_SERIES_START;
    let mut levels = Vec::with_capacity(length);
    levels.push(level);
    for _ in 1..length {
        let z: f64 = rng.sample(StandardNormal);
        level += z;
        levels.push(level);
    }

    debug!(length, ?direction, %first, "generated random walk");
    Series::from_values(first, &levels)
}

fn rolling_statistic<F>(x: &Series, w: &Window, min_observations: usize, statistic: F) -> Result<Series>
where
    F: Fn(&[f64]) -> f64,
{
    let values = x.values();
    let observations = rolling_apply(&x.dates(), w, |start, end| {
        let slice = &values[start..=end];
        if slice.len() < min_observations {
            return None;
        }
        let value = statistic(slice);
        value.is_finite().then_some(value)
    })?;

    Series::new(observations)
}

/// Rolling arithmetic mean.
pub fn mean(x: &Series, w: &Window) -> Result<Series> {
    rolling_statistic(x, w, 1, |values| values.mean())
}

/// Rolling sample standard deviation. Windows with fewer than two observations produce no value.
pub fn std(x: &Series, w: &Window) -> Result<Series> {
    rolling_statistic(x, w, 2, |values| values.std_dev())
}

/// Rolling sample variance.
pub fn var(x: &Series, w: &Window) -> Result<Series> {
    rolling_statistic(x, w, 2, |values| values.variance())
}

pub fn min(x: &Series, w: &Window) -> Result<Series> {
    rolling_statistic(x, w, 1, |values| Statistics::min(values))
}

pub fn max(x: &Series, w: &Window) -> Result<Series> {
    rolling_statistic(x, w, 1, |values| Statistics::max(values))
}
