use crate::{AnalyticsError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Date-indexed series of finite values with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        for (position, observation) in observations.iter().enumerate() {
            if !observation.value.is_finite() {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "non-finite value {} on {}",
                    observation.value, observation.date
                )));
            }
            if position > 0 && observations[position - 1].date >= observation.date {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "dates must be strictly increasing, {} follows {}",
                    observation.date,
                    observations[position - 1].date
                )));
            }
        }

        Ok(Self { observations })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a series on consecutive calendar days starting at `start`.
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let observations = values
            .iter()
            .enumerate()
            .map(|(offset, &value)| {
                start
                    .checked_add_days(Days::new(offset as u64))
                    .map(|date| Observation::new(date, value))
                    .ok_or_else(|| AnalyticsError::InvalidSeries(format!("date overflow after {}", start)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(observations)
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(pairs.into_iter().map(|(date, value)| Observation::new(date, value)).collect())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by(|o| o.date.cmp(&date))
            .ok()
            .map(|position| self.observations[position].value)
    }

    /// Position of the last observation dated on or before `date`.
    pub fn position_as_of(&self, date: NaiveDate) -> Option<usize> {
        match self.observations.partition_point(|o| o.date <= date) {
            0 => None,
            count => Some(count - 1),
        }
    }

    pub fn value_as_of(&self, date: NaiveDate) -> Option<f64> {
        self.position_as_of(date).map(|position| self.observations[position].value)
    }

    pub fn map_values<F>(&self, mut f: F) -> Result<Series>
    where
        F: FnMut(f64) -> f64,
    {
        Series::new(
            self.observations
                .iter()
                .map(|o| Observation::new(o.date, f(o.value)))
                .collect(),
        )
    }

    pub fn scale(&self, factor: f64) -> Result<Series> {
        self.map_values(|value| value * factor)
    }

    /// Restricts both series to the dates they have in common.
    pub fn intersect(&self, other: &Series) -> (Series, Series) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < self.observations.len() && j < other.observations.len() {
            let (a, b) = (self.observations[i], other.observations[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    left.push(a);
                    right.push(b);
                    i += 1;
                    j += 1;
                }
            }
        }

        (Series { observations: left }, Series { observations: right })
    }

    pub fn slice_from(&self, position: usize) -> Series {
        Series {
            observations: self.observations.get(position..).map(<[Observation]>::to_vec).unwrap_or_default(),
        }
    }
}

impl TryFrom<Vec<Observation>> for Series {
    type Error = AnalyticsError;

    fn try_from(observations: Vec<Observation>) -> Result<Self> {
        Series::new(observations)
    }
}

impl From<Series> for Vec<Observation> {
    fn from(series: Series) -> Self {
        series.observations
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
