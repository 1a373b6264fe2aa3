//! When a job fires.

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use std::fmt;
use std::time::Duration;

use super::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fixed period measured from the previous fire (or from start).
    Interval(Duration),
    /// Every day at the given local wall-clock times.
    Daily(Vec<NaiveTime>),
}

impl Trigger {
    /// Daily trigger with times sorted and deduplicated.
    pub fn daily(times: impl IntoIterator<Item = NaiveTime>) -> Self {
        let mut times: Vec<NaiveTime> = times.into_iter().collect();
        times.sort();
        times.dedup();
        Trigger::Daily(times)
    }

    /// First fire time strictly after `now`, or `None` if the trigger never
    /// fires (an empty daily list or a zero interval).
    pub fn next_fire_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Trigger::Interval(period) => {
                if period.is_zero() {
                    return None;
                }
                ChronoDuration::from_std(*period).ok().map(|p| now + p)
            }
            Trigger::Daily(times) => {
                let today = now.date();
                let mut sorted = times.clone();
                sorted.sort();
                if let Some(time) = sorted.iter().find(|t| today.and_time(**t) > now) {
                    return Some(today.and_time(*time));
                }
                let first = sorted.first()?;
                today.succ_opt().map(|tomorrow| tomorrow.and_time(*first))
            }
        }
    }

    /// Real time to wait until the next fire, measured on `clock`.
    ///
    /// Daily fire times are wall times, so the wait goes through the clock's
    /// time zone and stays correct across daylight-saving changes.
    pub fn delay_from(&self, clock: &dyn Clock) -> Option<Duration> {
        let now = clock.now();
        match self {
            Trigger::Interval(period) if !period.is_zero() => Some(*period),
            _ => self
                .next_fire_after(now)
                .map(|next| clock.duration_between(now, next)),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Interval(period) => write!(f, "every {}s", period.as_secs()),
            Trigger::Daily(times) => {
                let list: Vec<String> = times.iter().map(|t| t.format("%H:%M").to_string()).collect();
                write!(f, "daily at {}", list.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    struct Pinned(NaiveDateTime);

    impl Clock for Pinned {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_daily_same_day() {
        let trigger = Trigger::daily([hm(13, 0), hm(6, 0)]);
        assert_eq!(trigger.next_fire_after(at(1, 5, 59)), Some(at(1, 6, 0)));
        assert_eq!(trigger.next_fire_after(at(1, 6, 0)), Some(at(1, 13, 0)));
        assert_eq!(trigger.next_fire_after(at(1, 9, 30)), Some(at(1, 13, 0)));
    }

    #[test]
    fn test_daily_rolls_to_tomorrow() {
        let trigger = Trigger::daily([hm(6, 0), hm(13, 0)]);
        assert_eq!(trigger.next_fire_after(at(1, 13, 0)), Some(at(2, 6, 0)));
        assert_eq!(trigger.next_fire_after(at(31, 23, 0)).map(|t| t.date()),
            NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_aligned_scrape_slots() {
        let trigger = Trigger::daily([hm(0, 0), hm(6, 0), hm(12, 0), hm(18, 0)]);
        assert_eq!(trigger.next_fire_after(at(1, 7, 15)), Some(at(1, 12, 0)));
        assert_eq!(trigger.next_fire_after(at(1, 18, 0)), Some(at(2, 0, 0)));
        assert_eq!(
            trigger.delay_from(&Pinned(at(1, 17, 0))),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn test_interval() {
        let trigger = Trigger::Interval(Duration::from_secs(90));
        assert_eq!(
            trigger.next_fire_after(at(1, 0, 0)),
            Some(at(1, 0, 1) + ChronoDuration::seconds(30))
        );
        assert_eq!(Trigger::Interval(Duration::ZERO).next_fire_after(at(1, 0, 0)), None);
        assert_eq!(
            trigger.delay_from(&Pinned(at(1, 0, 0))),
            Some(Duration::from_secs(90))
        );
    }

    #[test]
    fn test_empty_daily_never_fires() {
        assert_eq!(Trigger::Daily(Vec::new()).next_fire_after(at(1, 0, 0)), None);
    }
}
