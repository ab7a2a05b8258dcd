//! Schedule clock: where an instant falls relative to a schedule's base time.
//!
//! The base time is hour 0 of day 0 (conventionally a Monday midnight).
//! Everything here is a pure function of `(base_time, now)`, so replaying a
//! tick at the same instant always produces the same hour, day and shard.
//! Euclidean division keeps `hour_of_day` in `0..24` and `day_of_week` in
//! `0..7` even for instants before the base time.

use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: i64 = 60 * 60;
pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_WEEK: i64 = 7;

/// How often a scheduled schema repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeats {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleClock {
    pub elapsed_hours: i64,
    pub elapsed_days: i64,
    pub elapsed_weeks: i64,
    pub hour_of_day: u8,
    pub day_of_week: u8,
}

impl ScheduleClock {
    /// Both instants are Unix timestamps in seconds.
    pub fn at(base_time: i64, now: i64) -> Self {
        let elapsed_hours = (now - base_time).div_euclid(SECONDS_PER_HOUR);
        let elapsed_days = elapsed_hours.div_euclid(HOURS_PER_DAY);
        let hour_of_day = elapsed_hours.rem_euclid(HOURS_PER_DAY);
        let elapsed_weeks = elapsed_days.div_euclid(DAYS_PER_WEEK);
        let day_of_week = elapsed_days.rem_euclid(DAYS_PER_WEEK);

        Self {
            elapsed_hours,
            elapsed_days,
            elapsed_weeks,
            // Both remainders are bounded by 24 and 7.
            hour_of_day: hour_of_day as u8,
            day_of_week: day_of_week as u8,
        }
    }

    /// Elapsed periods of the given cadence: days for daily, weeks for weekly.
    pub fn elapsed_periods(&self, repeats: Repeats) -> i64 {
        match repeats {
            Repeats::Daily => self.elapsed_days,
            Repeats::Weekly => self.elapsed_weeks,
        }
    }
}

/// The shard a run at `clock` must process: elapsed periods mod `num_shards`.
///
/// `num_shards` of zero is rejected by schedule validation; it maps to
/// shard 0 here rather than dividing by zero.
pub fn valid_shard(clock: &ScheduleClock, repeats: Repeats, num_shards: u32) -> u32 {
    if num_shards == 0 {
        return 0;
    }
    clock
        .elapsed_periods(repeats)
        .rem_euclid(i64::from(num_shards)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 2022-05-23T00:00:00Z, a Monday.
    const MONDAY: i64 = 1_653_264_000;
    const HOUR: i64 = SECONDS_PER_HOUR;

    #[test]
    fn base_time_is_hour_zero_day_zero() {
        let clock = ScheduleClock::at(MONDAY, MONDAY);
        assert_eq!(clock.hour_of_day, 0);
        assert_eq!(clock.day_of_week, 0);
        assert_eq!(clock.elapsed_days, 0);
    }

    #[test]
    fn twenty_five_hours_later_is_tuesday_one_am() {
        let clock = ScheduleClock::at(MONDAY, MONDAY + 25 * HOUR);
        assert_eq!(clock.elapsed_days, 1);
        assert_eq!(clock.hour_of_day, 1);
        assert_eq!(clock.day_of_week, 1);
        assert_eq!(valid_shard(&clock, Repeats::Daily, 4), 1);
    }

    #[test]
    fn partial_hours_round_down() {
        let clock = ScheduleClock::at(MONDAY, MONDAY + 2 * HOUR - 1);
        assert_eq!(clock.hour_of_day, 1);
    }

    #[test]
    fn weekly_shard_uses_elapsed_weeks() {
        // Day 16: week 2, day 2 (Wednesday).
        let clock = ScheduleClock::at(MONDAY, MONDAY + 16 * 24 * HOUR + 7 * HOUR);
        assert_eq!(clock.elapsed_weeks, 2);
        assert_eq!(clock.day_of_week, 2);
        assert_eq!(valid_shard(&clock, Repeats::Weekly, 3), 2);
        assert_eq!(valid_shard(&clock, Repeats::Daily, 3), 1);
    }

    #[test]
    fn before_base_time_stays_in_range() {
        let clock = ScheduleClock::at(MONDAY, MONDAY - 1);
        assert_eq!(clock.elapsed_hours, -1);
        assert_eq!(clock.hour_of_day, 23);
        assert_eq!(clock.day_of_week, 6);
        assert_eq!(valid_shard(&clock, Repeats::Daily, 4), 3);
    }

    #[test]
    fn zero_shards_is_shard_zero() {
        let clock = ScheduleClock::at(MONDAY, MONDAY + 100 * HOUR);
        assert_eq!(valid_shard(&clock, Repeats::Daily, 0), 0);
    }

    proptest! {
        #[test]
        fn shard_is_deterministic_and_in_range(
            offset in -10_000_000_i64..100_000_000,
            shards in 1_u32..64,
            weekly in any::<bool>(),
        ) {
            let repeats = if weekly { Repeats::Weekly } else { Repeats::Daily };
            let a = ScheduleClock::at(MONDAY, MONDAY + offset);
            let b = ScheduleClock::at(MONDAY, MONDAY + offset);
            prop_assert_eq!(a, b);
            prop_assert!(a.hour_of_day < 24);
            prop_assert!(a.day_of_week < 7);
            let shard = valid_shard(&a, repeats, shards);
            prop_assert_eq!(shard, valid_shard(&b, repeats, shards));
            prop_assert!(shard < shards);
        }
    }
}
