use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{EnvError, GymResult};

/// Days of the week.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Decodes the `DayOfWeek` column encoding (`0 = Sunday .. 6 = Saturday`).
    ///
    /// Values that do not denote a whole day in that range return `None`.
    pub fn from_days_from_sunday(value: f64) -> Option<Self> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        match value as i64 {
            0 => Some(Weekday::Sunday),
            1 => Some(Weekday::Monday),
            2 => Some(Weekday::Tuesday),
            3 => Some(Weekday::Wednesday),
            4 => Some(Weekday::Thursday),
            5 => Some(Weekday::Friday),
            6 => Some(Weekday::Saturday),
            _ => None,
        }
    }

    /// The regular Forex trading week.
    pub fn working_week() -> BTreeSet<Weekday> {
        BTreeSet::from([
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
        ])
    }
}

/// An inclusive band of hours `[first, last]` within a day.
///
/// # Semantics
/// * Both bounds are inclusive and must lie in `0..=23`.
/// * No wrapping: `first` must not exceed `last`. Overnight bands are not supported.
///
/// # Example
/// `first=2, last=22` treats 02:00 up to and including the 22:xx bar as regular hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HourBand {
    first: u8,
    last: u8,
}

impl HourBand {
    /// Creates a new hour band.
    ///
    /// # Errors
    /// Returns an error if either bound exceeds 23 or if `first > last`.
    pub fn new(first: u8, last: u8) -> GymResult<Self> {
        let band = Self { first, last };
        band.validate()?;
        Ok(band)
    }

    /// Every hour of the day, `[0, 23]`.
    pub fn full_day() -> Self {
        Self { first: 0, last: 23 }
    }

    pub fn first(&self) -> u8 {
        self.first
    }

    pub fn last(&self) -> u8 {
        self.last
    }

    pub fn contains(&self, hour: f64) -> bool {
        hour >= f64::from(self.first) && hour <= f64::from(self.last)
    }

    pub(crate) fn validate(&self) -> GymResult<()> {
        if self.first > 23 || self.last > 23 {
            return Err(EnvError::InvalidHourBand {
                first: self.first,
                last: self.last,
                msg: "hours must be in the range 0-23".to_string(),
            }
            .into());
        }
        if self.first > self.last {
            return Err(EnvError::InvalidHourBand {
                first: self.first,
                last: self.last,
                msg: "first hour must not exceed last hour (wrapping not supported)".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for HourBand {
    fn default() -> Self {
        Self::full_day()
    }
}
