use crate::{AnalyticsError, Observation, Result};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Calendar offset written as `<count><unit>`, e.g. `5d`, `2w`, `3m`, `1y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    pub count: u32,
    pub unit: TenorUnit,
}

impl Tenor {
    pub fn new(count: u32, unit: TenorUnit) -> Result<Self> {
        if count == 0 {
            return Err(AnalyticsError::InvalidTenor("tenor count must be positive".to_string()));
        }
        Ok(Self { count, unit })
    }

    pub fn days(count: u32) -> Result<Self> {
        Self::new(count, TenorUnit::Day)
    }

    pub fn weeks(count: u32) -> Result<Self> {
        Self::new(count, TenorUnit::Week)
    }

    pub fn months(count: u32) -> Result<Self> {
        Self::new(count, TenorUnit::Month)
    }

    pub fn years(count: u32) -> Result<Self> {
        Self::new(count, TenorUnit::Year)
    }

    fn shift(&self, date: NaiveDate, forward: bool) -> Option<NaiveDate> {
        let by_days = |days: u64| {
            if forward {
                date.checked_add_days(Days::new(days))
            } else {
                date.checked_sub_days(Days::new(days))
            }
        };
        let by_months = |months: u32| {
            if forward {
                date.checked_add_months(Months::new(months))
            } else {
                date.checked_sub_months(Months::new(months))
            }
        };

        match self.unit {
            TenorUnit::Day => by_days(u64::from(self.count)),
            TenorUnit::Week => by_days(7 * u64::from(self.count)),
            TenorUnit::Month => by_months(self.count),
            TenorUnit::Year => self.count.checked_mul(12).and_then(by_months),
        }
    }

    pub fn subtract_from(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.shift(date, false)
            .ok_or_else(|| AnalyticsError::InvalidTenor(format!("{} before {} is out of range", self, date)))
    }

    pub fn add_to(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.shift(date, true)
            .ok_or_else(|| AnalyticsError::InvalidTenor(format!("{} after {} is out of range", self, date)))
    }
}

impl FromStr for Tenor {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let unit = match s.chars().last() {
            Some('d') => TenorUnit::Day,
            Some('w') => TenorUnit::Week,
            Some('m') => TenorUnit::Month,
            Some('y') => TenorUnit::Year,
            _ => return Err(AnalyticsError::InvalidTenor(format!("unknown tenor unit in '{}'", s))),
        };
        let count = s[..s.len() - 1]
            .parse::<u32>()
            .map_err(|_| AnalyticsError::InvalidTenor(format!("invalid tenor count in '{}'", s)))?;

        Tenor::new(count, unit)
    }
}

impl TryFrom<String> for Tenor {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TenorUnit::Day => 'd',
            TenorUnit::Week => 'w',
            TenorUnit::Month => 'm',
            TenorUnit::Year => 'y',
        };
        write!(f, "{}{}", self.count, unit)
    }
}

/// Extent of a rolling window or ramp: a number of observations or a calendar tenor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowSize {
    Observations(usize),
    Tenor(Tenor),
}

impl From<usize> for WindowSize {
    fn from(observations: usize) -> Self {
        WindowSize::Observations(observations)
    }
}

impl From<Tenor> for WindowSize {
    fn from(tenor: Tenor) -> Self {
        WindowSize::Tenor(tenor)
    }
}

/// Rolling window with a ramp-up period.
///
/// An unset size spans the whole series. An unset ramp equals the size, or
/// zero when the size is unset as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Window {
    #[serde(rename = "w", default)]
    pub size: Option<WindowSize>,
    #[serde(rename = "r", default)]
    pub ramp: Option<WindowSize>,
}

impl Window {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn observations(count: usize) -> Self {
        Self {
            size: Some(WindowSize::Observations(count)),
            ramp: None,
        }
    }

    pub fn tenor(tenor: Tenor) -> Self {
        Self {
            size: Some(WindowSize::Tenor(tenor)),
            ramp: None,
        }
    }

    pub fn with_ramp(mut self, ramp: impl Into<WindowSize>) -> Self {
        self.ramp = Some(ramp.into());
        self
    }

    pub fn without_ramp(self) -> Self {
        self.with_ramp(WindowSize::Observations(0))
    }

    /// Resolves defaults against a series of `len` observations.
    pub(crate) fn resolve(&self, len: usize) -> Result<(WindowSize, WindowSize)> {
        let size = match self.size {
            Some(WindowSize::Observations(0)) => {
                return Err(AnalyticsError::InvalidWindow("window size must be positive".to_string()))
            }
            Some(size) => size,
            None => WindowSize::Observations(len.max(1)),
        };
        let ramp = match (self.ramp, self.size) {
            (Some(ramp), _) => ramp,
            (None, Some(size)) => size,
            (None, None) => WindowSize::Observations(0),
        };
        Ok((size, ramp))
    }
}

/// Evaluates `f(start, end)` over every window ending at each date, where
/// `start..=end` are the positions inside the window. Points inside the ramp
/// or for which `f` yields `None` are left out of the result.
pub(crate) fn rolling_apply<F>(dates: &[NaiveDate], window: &Window, mut f: F) -> Result<Vec<Observation>>
where
    F: FnMut(usize, usize) -> Option<f64>,
{
    let (size, ramp) = window.resolve(dates.len())?;
    let ramp_end = match (ramp, dates.first()) {
        (WindowSize::Tenor(tenor), Some(&first)) => Some(tenor.add_to(first)?),
        _ => None,
    };

    let mut output = Vec::with_capacity(dates.len());
    for (end, &date) in dates.iter().enumerate() {
        let in_ramp = match ramp {
            WindowSize::Observations(count) => end < count,
            WindowSize::Tenor(_) => ramp_end.is_some_and(|ramp_end| date < ramp_end),
        };
        if in_ramp {
            continue;
        }

        let start = match size {
            WindowSize::Observations(count) => (end + 1).saturating_sub(count),
            WindowSize::Tenor(tenor) => {
                let cutoff = tenor.subtract_from(date)?;
                dates[..=end].partition_point(|&d| d <= cutoff)
            }
        };

        if let Some(value) = f(start, end) {
            output.push(Observation::new(date, value));
        }
    }

    Ok(output)
}

/// Offset used by `returns`, `diff` and `lag`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lookback {
    Observations(isize),
    Tenor(Tenor),
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Observations(1)
    }
}

impl From<isize> for Lookback {
    fn from(observations: isize) -> Self {
        Lookback::Observations(observations)
    }
}

impl From<Tenor> for Lookback {
    fn from(tenor: Tenor) -> Self {
        Lookback::Tenor(tenor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(count: u64) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count).map(|offset| start + Days::new(offset)).collect()
    }

    #[test]
    fn parses_tenors() {
        assert_eq!("3m".parse::<Tenor>().unwrap(), Tenor::months(3).unwrap());
        assert_eq!(" 1Y ".parse::<Tenor>().unwrap(), Tenor::years(1).unwrap());
        assert_eq!(Tenor::weeks(2).unwrap().to_string(), "2w");
        assert!("0d".parse::<Tenor>().is_err());
        assert!("m".parse::<Tenor>().is_err());
        assert!("5q".parse::<Tenor>().is_err());
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let shifted = Tenor::months(1).unwrap().subtract_from(date).unwrap();
        assert_eq!(shifted, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn oversized_tenors_are_out_of_range() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        for text in ["400000000y", "4294967295y", "4294967295m", "4294967295w", "4294967295d"] {
            let tenor: Tenor = text.parse().unwrap();
            assert!(matches!(tenor.subtract_from(date), Err(AnalyticsError::InvalidTenor(_))), "{}", text);
            assert!(matches!(tenor.add_to(date), Err(AnalyticsError::InvalidTenor(_))), "{}", text);
        }
    }

    #[test]
    fn default_window_expands_over_whole_series() {
        let windows = rolling_apply(&dates(4), &Window::full(), |start, end| Some((end - start + 1) as f64)).unwrap();
        let sizes: Vec<f64> = windows.iter().map(|o| o.value).collect();
        assert_eq!(sizes, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn observation_window_applies_ramp() {
        let windows = rolling_apply(&dates(5), &Window::observations(3), |start, end| Some((end - start + 1) as f64)).unwrap();
        let sizes: Vec<f64> = windows.iter().map(|o| o.value).collect();
        assert_eq!(sizes, vec![3.0, 3.0]);

        let windows = rolling_apply(&dates(5), &Window::observations(3).without_ramp(), |start, end| {
            Some((end - start + 1) as f64)
        })
        .unwrap();
        let sizes: Vec<f64> = windows.iter().map(|o| o.value).collect();
        assert_eq!(sizes, vec![1.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn tenor_window_covers_half_open_interval() {
        let window = Window::tenor(Tenor::days(2).unwrap());
        let windows = rolling_apply(&dates(5), &window, |start, end| Some((end - start + 1) as f64)).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(windows.iter().all(|o| o.value == 2.0));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let result = rolling_apply(&dates(3), &Window::observations(0), |_, _| Some(0.0));
        assert!(matches!(result, Err(AnalyticsError::InvalidWindow(_))));
    }

    #[test]
    fn window_deserializes_numbers_and_tenors() {
        let window: Window = serde_json::from_str(r#"{"w": 22, "r": "1m"}"#).unwrap();
        assert_eq!(window.size, Some(WindowSize::Observations(22)));
        assert_eq!(window.ramp, Some(WindowSize::Tenor(Tenor::months(1).unwrap())));

        let lookback: Lookback = serde_json::from_str("-2").unwrap();
        assert_eq!(lookback, Lookback::Observations(-2));
    }
}
