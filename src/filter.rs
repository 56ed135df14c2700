use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;

use crate::error::ConfigError;

pub const HOURS: RangeInclusive<u32> = 0..=23;
pub const WEEKDAYS: RangeInclusive<u32> = 0..=6;

/// A set of small integers written as `0-5,7,11-21`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSet(BTreeSet<u32>);

impl NumberSet {
    pub fn full(limits: RangeInclusive<u32>) -> Self {
        Self(limits.collect())
    }

    /// Parses a comma separated list of values and inclusive `a-b` ranges, all of
    /// which must lie within `limits`.
    pub fn parse(input: &str, limits: RangeInclusive<u32>) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSequence {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };
        let number = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| invalid(&format!("{:?} is not a number", part.trim())))
        };

        let mut values = BTreeSet::new();
        for part in input.split(',') {
            if part.trim().is_empty() {
                return Err(invalid("empty element"));
            }

            let (first, last) = match part.split_once('-') {
                Some((first, last)) => (number(first)?, number(last)?),
                None => {
                    let value = number(part)?;
                    (value, value)
                }
            };
            if first > last {
                return Err(invalid(&format!("range {}-{} is descending", first, last)));
            }

            for value in [first, last] {
                if !limits.contains(&value) {
                    return Err(ConfigError::OutOfLimits {
                        input: input.to_owned(),
                        value,
                        min: *limits.start(),
                        max: *limits.end(),
                    });
                }
            }

            values.extend(first..=last);
        }

        Ok(Self(values))
    }

    pub fn contains(&self, value: i64) -> bool {
        u32::try_from(value).is_ok_and(|value| self.0.contains(&value))
    }
}

impl Display for NumberSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ranges = self
            .0
            .iter()
            .map(|&value| (value, value))
            .coalesce(|(a, b), (c, d)| {
                if b + 1 == c {
                    Ok((a, d))
                } else {
                    Err(((a, b), (c, d)))
                }
            })
            .map(|(a, b)| if a == b { a.to_string() } else { format!("{}-{}", a, b) });
        write!(f, "{}", ranges.format(","))
    }
}

/// Why a record was left out of the accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    Hour,
    Weekday,
    BeforeStart,
    AfterEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    hours: NumberSet,
    weekdays: NumberSet,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            hours: NumberSet::full(HOURS),
            weekdays: NumberSet::full(WEEKDAYS),
            start_date: None,
            end_date: None,
        }
    }
}

impl RecordFilter {
    pub fn new(
        hours: NumberSet,
        weekdays: NumberSet,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ConfigError> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(ConfigError::DateOrder { start, end });
            }
        }

        Ok(Self {
            hours,
            weekdays,
            start_date,
            end_date,
        })
    }

    /// Checks hour, weekday, start date and end date, in that order.
    pub fn check(&self, date: NaiveDate, hour: i64) -> Result<(), Rejection> {
        if !self.hours.contains(hour) {
            return Err(Rejection::Hour);
        }
        if !self
            .weekdays
            .contains(date.weekday().num_days_from_monday().into())
        {
            return Err(Rejection::Weekday);
        }
        if self.start_date.is_some_and(|start| date < start) {
            return Err(Rejection::BeforeStart);
        }
        if self.end_date.is_some_and(|end| date > end) {
            return Err(Rejection::AfterEnd);
        }

        Ok(())
    }
}

impl Display for RecordFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hours {}, weekdays {}", self.hours, self.weekdays)?;
        if let Some(start) = self.start_date {
            write!(f, ", from {}", start)?;
        }
        if let Some(end) = self.end_date {
            write!(f, ", until {}", end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_values_and_ranges() {
        let set = NumberSet::parse("0-5,7,11-21", HOURS).unwrap();
        assert!(set.contains(0) && set.contains(5) && set.contains(7) && set.contains(21));
        assert!(!set.contains(6) && !set.contains(10) && !set.contains(22));
        assert_eq!(set.to_string(), "0-5,7,11-21");
    }

    #[test]
    fn rejects_values_outside_limits() {
        assert_eq!(
            NumberSet::parse("3-7", WEEKDAYS),
            Err(ConfigError::OutOfLimits {
                input: "3-7".into(),
                value: 7,
                min: 0,
                max: 6
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "a", "1,,2", "5-2", "1-"] {
            assert!(
                matches!(
                    NumberSet::parse(input, HOURS),
                    Err(ConfigError::InvalidSequence { .. })
                ),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn negative_and_huge_values_are_not_contained() {
        let set = NumberSet::full(HOURS);
        assert!(!set.contains(-1));
        assert!(!set.contains(24));
        assert!(!set.contains(i64::MAX));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let result = RecordFilter::new(
            NumberSet::full(HOURS),
            NumberSet::full(WEEKDAYS),
            Some(date(2011, 6, 19)),
            Some(date(2011, 5, 23)),
        );
        assert!(matches!(result, Err(ConfigError::DateOrder { .. })));

        let same_day = RecordFilter::new(
            NumberSet::full(HOURS),
            NumberSet::full(WEEKDAYS),
            Some(date(2011, 5, 23)),
            Some(date(2011, 5, 23)),
        );
        assert!(same_day.is_ok());
    }

    #[test]
    fn checks_in_order() {
        // 2019-01-07 is a Monday
        let filter = RecordFilter::new(
            NumberSet::parse("8", HOURS).unwrap(),
            NumberSet::parse("0", WEEKDAYS).unwrap(),
            Some(date(2019, 1, 7)),
            Some(date(2019, 1, 7)),
        )
        .unwrap();

        assert_eq!(filter.check(date(2019, 1, 7), 8), Ok(()));
        assert_eq!(filter.check(date(2019, 1, 8), 9), Err(Rejection::Hour));
        assert_eq!(filter.check(date(2019, 1, 8), 8), Err(Rejection::Weekday));
        assert_eq!(filter.check(date(2018, 12, 31), 8), Err(Rejection::BeforeStart));
        assert_eq!(filter.check(date(2019, 1, 14), 8), Err(Rejection::AfterEnd));
    }

    #[test]
    fn default_accepts_everything_in_range() {
        let filter = RecordFilter::default();
        assert_eq!(filter.check(date(2000, 2, 29), 23), Ok(()));
        assert_eq!(filter.check(date(2000, 2, 29), 24), Err(Rejection::Hour));
    }
}
