//! Weekly draw timetable and active-draw resolution.
//!
//! The timetable maps each weekday to either a single all-day slot or a pair
//! of named slots (first and second generation). Slot hour ranges are
//! half-open (`[start_hour, end_hour)`) and are validated when the table is
//! built, so lookups never have to deal with overlapping or inverted ranges.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Draw name returned when no slot covers the requested time.
pub const UNKNOWN_DRAW: &str = "Unknown Draw";

/// A named draw window within a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSlot {
    pub start_hour: u32,
    pub end_hour: u32,
    pub name: String,
}

impl DrawSlot {
    pub fn new(start_hour: u32, end_hour: u32, name: impl Into<String>) -> Self {
        Self {
            start_hour,
            end_hour,
            name: name.into(),
        }
    }

    /// Whether `hour` falls inside `[start_hour, end_hour)`.
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    fn validate(&self, day: Weekday) -> Result<(), ScheduleTableError> {
        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err(ScheduleTableError::InvalidRange {
                day,
                name: self.name.clone(),
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        if self.name.trim().is_empty() {
            return Err(ScheduleTableError::EmptyName { day });
        }
        Ok(())
    }
}

/// The draws held on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySchedule {
    /// One draw spanning the whole trading day.
    AllDay(DrawSlot),
    /// A morning (first generation) and an afternoon (second generation) draw.
    Split { first: DrawSlot, second: DrawSlot },
}

impl DaySchedule {
    pub fn slots(&self) -> Vec<&DrawSlot> {
        match self {
            DaySchedule::AllDay(slot) => vec![slot],
            DaySchedule::Split { first, second } => vec![first, second],
        }
    }

    fn slot_at(&self, hour: u32) -> Option<&DrawSlot> {
        self.slots().into_iter().find(|slot| slot.contains(hour))
    }

    fn validate(&self, day: Weekday) -> Result<(), ScheduleTableError> {
        for slot in self.slots() {
            slot.validate(day)?;
        }
        if let DaySchedule::Split { first, second } = self {
            let disjoint = first.end_hour <= second.start_hour || second.end_hour <= first.start_hour;
            if !disjoint {
                return Err(ScheduleTableError::Overlap {
                    day,
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors raised while building a [`DrawScheduleTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleTableError {
    #[error("slot '{name}' on {day} has invalid hour range [{start_hour}, {end_hour})")]
    InvalidRange {
        day: Weekday,
        name: String,
        start_hour: u32,
        end_hour: u32,
    },
    #[error("slot on {day} has an empty draw name")]
    EmptyName { day: Weekday },
    #[error("slots '{first}' and '{second}' overlap on {day}")]
    Overlap {
        day: Weekday,
        first: String,
        second: String,
    },
}

/// Validated weekday → draw lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawScheduleTable {
    days: HashMap<Weekday, DaySchedule>,
}

impl DrawScheduleTable {
    /// Build a table, rejecting inverted, out-of-range or overlapping slots.
    pub fn new(
        days: impl IntoIterator<Item = (Weekday, DaySchedule)>,
    ) -> Result<Self, ScheduleTableError> {
        let days: HashMap<Weekday, DaySchedule> = days.into_iter().collect();
        for (day, schedule) in &days {
            schedule.validate(*day)?;
        }
        Ok(Self { days })
    }

    /// The reference timetable: noon rush 06-12 and an afternoon draw 13-18
    /// from Monday to Saturday, one all-day draw on Sunday.
    pub fn standard() -> Self {
        let split = |first: &str, second: &str| DaySchedule::Split {
            first: DrawSlot::new(6, 12, first),
            second: DrawSlot::new(13, 18, second),
        };
        let days = [
            (Weekday::Mon, split("Monday Noon Rush", "Monday Special")),
            (Weekday::Tue, split("Tuesday Noon Rush", "Lucky Tuesday")),
            (Weekday::Wed, split("Wednesday Noon Rush", "Midweek")),
            (Weekday::Thu, split("Thursday Noon Rush", "Fortune Thursday")),
            (Weekday::Fri, split("Friday Noon Rush", "Friday Bonanza")),
            (Weekday::Sat, split("Saturday Noon Rush", "National Weekly")),
            (Weekday::Sun, DaySchedule::AllDay(DrawSlot::new(6, 18, "Sunday Aseda"))),
        ];
        Self {
            days: days.into_iter().collect(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.get(&weekday)
    }

    /// Slot covering the given weekday and hour, if any.
    pub fn slot_at(&self, weekday: Weekday, hour: u32) -> Option<&DrawSlot> {
        self.days.get(&weekday).and_then(|day| day.slot_at(hour))
    }

    /// Name of the draw active at `now` (local wall-clock time), or
    /// [`UNKNOWN_DRAW`] for unscheduled days and gaps between slots.
    pub fn current_draw(&self, now: NaiveDateTime) -> String {
        self.slot_at(now.weekday(), now.hour())
            .map(|slot| slot.name.clone())
            .unwrap_or_else(|| UNKNOWN_DRAW.to_string())
    }
}

impl Default for DrawScheduleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for DrawSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:02}h-{:02}h)", self.name, self.start_hour, self.end_hour)
    }
}
