use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::{calendar::Weekday, domain::Price},
    error::{DataError, GymResult},
};

/// Fixed leading columns of every action table, in file order.
///
/// Anything after [`ActionColumn::MinuteOfHour`] is an indicator column and is exposed
/// untouched through [`ActionRow::indicators`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActionColumn {
    High,
    Low,
    Close,
    NextOpen,
    Volume,
    Month,
    DayOfMonth,
    DayOfWeek,
    HourOfDay,
    MinuteOfHour,
}

impl ActionColumn {
    /// Zero-based position of the column inside a row.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Number of columns an action table must at least carry.
pub const ACTION_COLUMNS: usize = ActionColumn::COUNT;

/// Strongly-typed view over one row of an action table.
///
/// Borrowed from the underlying [`TickTable`](crate::data::table::TickTable); decoding
/// copies the fixed fields and keeps a slice of the trailing indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionRow<'a> {
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub next_open: Price,
    pub volume: f64,
    pub month: f64,
    pub day_of_month: f64,
    /// Day of week, `0 = Sunday .. 6 = Saturday`.
    pub day_of_week: f64,
    pub hour_of_day: f64,
    pub minute_of_hour: f64,
    pub indicators: &'a [f64],
}

impl<'a> ActionRow<'a> {
    pub fn decode(fields: &'a [f64]) -> GymResult<Self> {
        if fields.len() < ACTION_COLUMNS {
            return Err(DataError::InsufficientColumns {
                required: ACTION_COLUMNS,
                found: fields.len(),
                msg: format!(
                    "expected leading columns {}",
                    ActionColumn::iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
            .into());
        }

        let field = |column: ActionColumn| fields[column.index()];
        Ok(Self {
            high: Price(field(ActionColumn::High)),
            low: Price(field(ActionColumn::Low)),
            close: Price(field(ActionColumn::Close)),
            next_open: Price(field(ActionColumn::NextOpen)),
            volume: field(ActionColumn::Volume),
            month: field(ActionColumn::Month),
            day_of_month: field(ActionColumn::DayOfMonth),
            day_of_week: field(ActionColumn::DayOfWeek),
            hour_of_day: field(ActionColumn::HourOfDay),
            minute_of_hour: field(ActionColumn::MinuteOfHour),
            indicators: &fields[ACTION_COLUMNS..],
        })
    }

    /// Calendar day of this tick, `None` when the column holds no valid day number.
    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::from_days_from_sunday(self.day_of_week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_indices_follow_file_layout() {
        assert_eq!(ActionColumn::High.index(), 0);
        assert_eq!(ActionColumn::Close.index(), 2);
        assert_eq!(ActionColumn::DayOfWeek.index(), 7);
        assert_eq!(ActionColumn::HourOfDay.index(), 8);
        assert_eq!(ACTION_COLUMNS, 10);
        assert_eq!(ActionColumn::NextOpen.to_string(), "next_open");
    }

    #[test]
    fn test_decode_names_every_field() {
        let fields = [
            1.2, 1.1, 1.15, 1.16, 500.0, 3.0, 14.0, 2.0, 9.0, 30.0, 0.5, 0.7,
        ];
        let row = ActionRow::decode(&fields).expect("row has all columns");

        assert_eq!(row.high, Price(1.2));
        assert_eq!(row.low, Price(1.1));
        assert_eq!(row.close, Price(1.15));
        assert_eq!(row.next_open, Price(1.16));
        assert_eq!(row.volume, 500.0);
        assert_eq!(row.day_of_week, 2.0);
        assert_eq!(row.hour_of_day, 9.0);
        assert_eq!(row.indicators, &[0.5, 0.7]);
        assert_eq!(row.weekday(), Some(Weekday::Tuesday));
    }

    #[test]
    fn test_decode_rejects_short_rows() {
        let fields = [1.0, 2.0, 3.0];
        assert!(ActionRow::decode(&fields).is_err());
    }
}
