//! Econometric transforms of date-indexed series: returns and their inverse,
//! annualization, lags and differences, and rolling volatility, correlation
//! and beta.

use crate::core::window::rolling_apply;
use crate::{
    statistics, AnalyticsError, LagMode, Lookback, Observation, Result, ReturnsType, Series, SeriesType, Window,
};
use chrono::{Days, NaiveDate};
use nalgebra as na;
use statrs::statistics::Statistics;
use tracing::{debug, warn};

/// Observations per year inferred from the average spacing of `x`.
///
/// Daily data (average gap below 2.1 days) maps to 252, weekly to 52, monthly
/// to 12, quarterly to 4 and annual to 1. Any other spacing is rejected.
pub fn annualization_factor(x: &Series) -> Result<f64> {
    if x.len() < 2 {
        return Err(AnalyticsError::InsufficientData(
            "at least two observations are needed to infer the annualization factor".to_string(),
        ));
    }

    let dates = x.dates();
    let total_days: i64 = dates.windows(2).map(|pair| (pair[1] - pair[0]).num_days()).sum();
    let average_distance = total_days as f64 / (dates.len() - 1) as f64;

    let factor = match average_distance {
        d if d < 2.1 => 252.0,
        d if (6.0..8.0).contains(&d) => 52.0,
        d if (25.0..35.0).contains(&d) => 12.0,
        d if (85.0..97.0).contains(&d) => 4.0,
        d if (360.0..386.0).contains(&d) => 1.0,
        d => {
            warn!(average_distance = d, "cannot infer annualization factor");
            return Err(AnalyticsError::IrregularSpacing(format!(
                "average distance of {:.2} days between observations is not a recognised frequency",
                d
            )));
        }
    };

    debug!(average_distance, factor, "inferred annualization factor");
    Ok(factor)
}

/// Scales `x` by the square root of its annualization factor.
pub fn annualize(x: &Series) -> Result<Series> {
    let factor = annualization_factor(x)?;
    x.scale(factor.sqrt())
}

fn period_return(current: f64, base: f64, returns_type: ReturnsType, date: NaiveDate) -> Result<f64> {
    match returns_type {
        ReturnsType::Simple => {
            if base == 0.0 {
                return Err(AnalyticsError::InvalidData(format!(
                    "simple return on {} is undefined for a zero base",
                    date
                )));
            }
            Ok(current / base - 1.0)
        }
        ReturnsType::Logarithmic => {
            if current <= 0.0 || base <= 0.0 {
                return Err(AnalyticsError::InvalidData(format!(
                    "logarithmic return on {} requires positive levels",
                    date
                )));
            }
            Ok(current.ln() - base.ln())
        }
        ReturnsType::Absolute => Ok(current - base),
    }
}

/// Returns of `series` over `obs`.
///
/// An observation lookback of `k` compares each point with the one `k`
/// positions earlier and omits the first `k` points. A tenor lookback compares
/// each point with the last value on or before `date - tenor` and omits points
/// for which there is none.
pub fn returns(series: &Series, obs: Lookback, returns_type: ReturnsType) -> Result<Series> {
    let points = series.as_slice();
    let mut output = Vec::with_capacity(points.len());

    match obs {
        Lookback::Observations(k) if k < 0 => {
            return Err(AnalyticsError::InvalidWindow(format!("returns lookback must not be negative, got {}", k)))
        }
        Lookback::Observations(k) => {
            let k = k as usize;
            for (position, point) in points.iter().enumerate().skip(k) {
                let base = points[position - k].value;
                output.push(Observation::new(point.date, period_return(point.value, base, returns_type, point.date)?));
            }
        }
        Lookback::Tenor(tenor) => {
            for point in points {
                let cutoff = tenor.subtract_from(point.date)?;
                if let Some(base) = series.value_as_of(cutoff) {
                    output.push(Observation::new(point.date, period_return(point.value, base, returns_type, point.date)?));
                }
            }
        }
    }

    Series::new(output)
}

/// Rebuilds price levels from a series of returns, starting from `initial`.
pub fn prices(series: &Series, initial: f64, returns_type: ReturnsType) -> Result<Series> {
    let mut level = initial;
    let mut cumulative = 0.0;
    let output = series
        .iter()
        .map(|point| {
            let value = match returns_type {
                ReturnsType::Simple => {
                    level *= 1.0 + point.value;
                    level
                }
                ReturnsType::Logarithmic => {
                    cumulative += point.value;
                    initial * cumulative.exp()
                }
                ReturnsType::Absolute => {
                    level += point.value;
                    level
                }
            };
            Observation::new(point.date, value)
        })
        .collect();

    Series::new(output)
}

/// Rebases `x` so that its first value equals `initial`.
pub fn index(x: &Series, initial: f64) -> Result<Series> {
    let first = match x.first() {
        Some(first) => *first,
        None => return Ok(Series::empty()),
    };
    if first.value == 0.0 {
        return Err(AnalyticsError::InvalidData(format!(
            "cannot index a series whose first value on {} is zero",
            first.date
        )));
    }

    x.map_values(|value| initial * value / first.value)
}

fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| AnalyticsError::InvalidData(format!("shifting {} by {} days is out of range", date, days)))
}

/// Moves values forward in time by `obs`; a negative observation count leads instead.
///
/// In [`LagMode::Extend`] new dates are appended past the end (or prepended
/// before the start when leading), spaced like the nearest existing gap.
pub fn lag(x: &Series, obs: Lookback, mode: LagMode) -> Result<Series> {
    if x.is_empty() {
        return Ok(Series::empty());
    }
    let points = x.as_slice();

    match obs {
        Lookback::Observations(0) => Ok(x.clone()),
        Lookback::Observations(k) if mode == LagMode::Truncate && k.unsigned_abs() >= points.len() => {
            Ok(Series::empty())
        }
        Lookback::Observations(k) => {
            let len = points.len() as isize;
            let out_of_range = || AnalyticsError::InvalidWindow(format!("lag of {} observations is out of range", k));
            let last_gap = match points.len() {
                1 => 1,
                n => (points[n - 1].date - points[n - 2].date).num_days(),
            };
            let first_gap = match points.len() {
                1 => 1,
                _ => (points[1].date - points[0].date).num_days(),
            };

            let mut output = Vec::with_capacity(points.len());
            for (position, point) in points.iter().enumerate() {
                let target = (position as isize).checked_add(k).ok_or_else(out_of_range)?;
                let date = if (0..len).contains(&target) {
                    points[target as usize].date
                } else if mode == LagMode::Truncate {
                    continue;
                } else if target >= len {
                    let days = last_gap.checked_mul((target - len + 1) as i64).ok_or_else(out_of_range)?;
                    shift_days(points[points.len() - 1].date, days)?
                } else {
                    let days = first_gap.checked_mul(target as i64).ok_or_else(out_of_range)?;
                    shift_days(points[0].date, days)?
                };
                output.push(Observation::new(date, point.value));
            }

            Series::new(output)
        }
        Lookback::Tenor(tenor) => {
            let last_date = points[points.len() - 1].date;
            let mut output: Vec<Observation> = Vec::with_capacity(points.len());

            for point in points {
                let date = tenor.add_to(point.date)?;
                if mode == LagMode::Truncate && date > last_date {
                    break;
                }
                // Month-end clamping can map two dates onto one; the later value wins.
                if output.last().is_some_and(|previous| previous.date == date) {
                    output.pop();
                }
                output.push(Observation::new(date, point.value));
            }

            Series::new(output)
        }
    }
}

/// Difference between each value and the value `obs` earlier.
pub fn diff(x: &Series, obs: Lookback) -> Result<Series> {
    returns(x, obs, ReturnsType::Absolute)
}

/// Annualized realized volatility in percent, from one-period returns over a rolling window.
pub fn volatility(x: &Series, w: &Window, returns_type: ReturnsType) -> Result<Series> {
    if x.is_empty() {
        return Ok(Series::empty());
    }

    let factor = annualization_factor(x)?;
    let period_returns = returns(x, Lookback::Observations(1), returns_type)?;
    let deviation = statistics::std(&period_returns, w)?;

    deviation.scale(factor.sqrt() * 100.0)
}

fn to_returns(x: &Series, series_type: SeriesType) -> Result<Series> {
    match series_type {
        SeriesType::Prices => returns(x, Lookback::Observations(1), ReturnsType::Simple),
        SeriesType::Returns => Ok(x.clone()),
    }
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 {
        return None;
    }
    let deviation_a = a.std_dev();
    let deviation_b = b.std_dev();
    if deviation_a == 0.0 || deviation_b == 0.0 {
        return None;
    }
    let rho = a.covariance(b) / (deviation_a * deviation_b);
    rho.is_finite().then_some(rho.clamp(-1.0, 1.0))
}

/// Rolling Pearson correlation of `x` and `y` over their common dates.
///
/// Price inputs are converted to simple returns first. Windows where either
/// side is constant produce no value.
pub fn correlation(x: &Series, y: &Series, w: &Window, series_type: SeriesType) -> Result<Series> {
    let (left, right) = to_returns(x, series_type)?.intersect(&to_returns(y, series_type)?);
    let (a, b) = (left.values(), right.values());

    let observations = rolling_apply(&left.dates(), w, |start, end| pearson(&a[start..=end], &b[start..=end]))?;
    Series::new(observations)
}

/// Rolling beta of `x` against `benchmark`: `cov(x, benchmark) / var(benchmark)`.
pub fn beta(x: &Series, benchmark: &Series, w: &Window, series_type: SeriesType) -> Result<Series> {
    let (left, right) = to_returns(x, series_type)?.intersect(&to_returns(benchmark, series_type)?);
    let (a, b) = (left.values(), right.values());

    let observations = rolling_apply(&left.dates(), w, |start, end| {
        if end - start < 1 {
            return None;
        }
        let (window_a, window_b) = (&a[start..=end], &b[start..=end]);
        let benchmark_variance = window_b.variance();
        if benchmark_variance == 0.0 {
            return None;
        }
        let value = window_a.covariance(window_b) / benchmark_variance;
        value.is_finite().then_some(value)
    })?;

    Series::new(observations)
}

/// Cash index compounding `annual_rate` on an actual/360 basis over the dates of `x`, starting at 1.
pub fn cash_index(x: &Series, annual_rate: f64) -> Result<Series> {
    let first = match x.first() {
        Some(first) => first.date,
        None => return Ok(Series::empty()),
    };

    let mut level = 1.0;
    let mut previous = first;
    let output = x
        .iter()
        .map(|point| {
            let accrual = (point.date - previous).num_days() as f64 / 360.0;
            level *= 1.0 + annual_rate * accrual;
            previous = point.date;
            Observation::new(point.date, level)
        })
        .collect();

    Series::new(output)
}

/// Price series of `x` in excess of `benchmark`, both given as levels.
///
/// Each step grows the running level by the difference between the two
/// one-period simple returns.
pub fn excess_returns(x: &Series, benchmark: &Series) -> Result<Series> {
    let (curve, bench) = x.intersect(benchmark);
    let (levels, bench_levels) = (curve.as_slice(), bench.as_slice());
    let Some(first) = levels.first() else {
        return Ok(Series::empty());
    };

    let mut output = Vec::with_capacity(levels.len());
    output.push(*first);
    let mut level = first.value;
    for position in 1..levels.len() {
        let date = levels[position].date;
        let own = period_return(levels[position].value, levels[position - 1].value, ReturnsType::Simple, date)?;
        let reference = period_return(
            bench_levels[position].value,
            bench_levels[position - 1].value,
            ReturnsType::Simple,
            date,
        )?;
        level *= 1.0 + own - reference;
        output.push(Observation::new(date, level));
    }

    Series::new(output)
}

/// Rolling Sharpe ratio of a price series against a constant annual cash rate.
pub fn sharpe_ratio(x: &Series, annual_rate: f64, w: &Window) -> Result<Series> {
    if x.is_empty() {
        return Ok(Series::empty());
    }

    let factor = annualization_factor(x)?;
    let excess = excess_returns(x, &cash_index(x, annual_rate)?)?;
    let excess_period = returns(&excess, Lookback::Observations(1), ReturnsType::Simple)?;
    let (dates, period_returns) = (excess_period.dates(), excess_period.values());

    let observations = rolling_apply(&dates, w, |start, end| {
        let window = &period_returns[start..=end];
        if window.len() < 2 {
            return None;
        }
        let deviation = window.std_dev();
        if deviation == 0.0 {
            return None;
        }
        let ratio = window.mean() * factor / (deviation * factor.sqrt());
        ratio.is_finite().then_some(ratio)
    })?;

    Series::new(observations)
}

/// Rolling maximum drawdown: the worst fall from a running peak within each window.
pub fn max_drawdown(x: &Series, w: &Window) -> Result<Series> {
    let values = x.values();
    let dates = x.dates();

    let peaks = rolling_apply(&dates, &w.without_ramp(), |start, end| Some(Statistics::max(&values[start..=end])))?;
    let mut drawdowns = Vec::with_capacity(values.len());
    for (peak, level) in peaks.iter().zip(&values) {
        if peak.value <= 0.0 {
            return Err(AnalyticsError::InvalidData(format!(
                "drawdown on {} requires a positive running peak",
                peak.date
            )));
        }
        drawdowns.push(level / peak.value - 1.0);
    }

    let observations = rolling_apply(&dates, w, |start, end| Some(Statistics::min(&drawdowns[start..=end])))?;
    Series::new(observations)
}

/// Full-sample correlation matrix of one-period simple returns, over the dates all series share.
///
/// A series whose returns are constant over those dates has no defined
/// correlation and is rejected.
pub fn correlation_matrix(series: &[Series]) -> Result<na::DMatrix<f64>> {
    if series.is_empty() {
        return Err(AnalyticsError::InsufficientData("no series supplied".to_string()));
    }

    let all_returns = series
        .iter()
        .map(|x| returns(x, Lookback::Observations(1), ReturnsType::Simple))
        .collect::<Result<Vec<_>>>()?;

    let common_dates: Vec<NaiveDate> = all_returns[0]
        .dates()
        .into_iter()
        .filter(|&date| all_returns[1..].iter().all(|r| r.value_on(date).is_some()))
        .collect();
    if common_dates.len() < 2 {
        return Err(AnalyticsError::InsufficientData(
            "fewer than two common return observations".to_string(),
        ));
    }

    let aligned: Vec<Vec<f64>> = all_returns
        .iter()
        .map(|r| common_dates.iter().filter_map(|&date| r.value_on(date)).collect())
        .collect();

    if let Some(position) = aligned.iter().position(|values| values.std_dev() == 0.0) {
        return Err(AnalyticsError::InvalidData(format!(
            "series {} has constant returns over the common dates, so its correlations are undefined",
            position
        )));
    }

    let n_assets = aligned.len();
    let mut matrix = na::DMatrix::identity(n_assets, n_assets);
    for i in 0..n_assets {
        for j in (i + 1)..n_assets {
            let rho = pearson(&aligned[i], &aligned[j]).ok_or_else(|| {
                AnalyticsError::InvalidData(format!("correlation of series {} and {} is undefined", i, j))
            })?;
            matrix[(i, j)] = rho;
            matrix[(j, i)] = rho;
        }
    }

    Ok(matrix)
}
