//! Schedule pattern expansion.
//!
//! Turns recurring meeting-date patterns (weekday sets, time ranges,
//! exception dates, multiple date blocks) into a deterministic, ordered
//! list of concrete calendar events for a display window.
//!
//! [`expand`] is pure: same input, same output, no side effects. Pattern
//! blocks that fail to parse are excluded from the result and reported in
//! [`Expansion::skipped`] so the caller can log them.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::activity::{ActivityItem, ActivityPattern};
use crate::types::ActivityId;

/// A pattern block whose fields could not be interpreted. Excludes that
/// block's contribution only; sibling blocks still expand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleDataError {
    /// `beginning_date` or `ending_date` is missing or not an ISO date.
    #[error("activity {activity_id}: unparseable pattern date bounds '{beginning}'..'{ending}'")]
    DateBounds {
        activity_id: ActivityId,
        beginning: String,
        ending: String,
    },

    /// A time-slot's weekday list contains no recognizable weekday.
    #[error("activity {activity_id}: unparseable weekdays '{weekdays}'")]
    Weekdays {
        activity_id: ActivityId,
        weekdays: String,
    },

    /// A time-slot's start or end time is present but not parseable.
    #[error("activity {activity_id}: unparseable meeting time '{value}'")]
    Time {
        activity_id: ActivityId,
        value: String,
    },
}

/// Inclusive date range a caller wants events materialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The full calendar month containing `year`/`month`.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start,
            end: next.pred_opt()?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One concrete meeting of an activity. Immutable value object; ordering
/// key is `(date, starting_time, name)`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CalendarEvent {
    pub activity_id: ActivityId,
    pub date: NaiveDate,
    pub starting_time: NaiveTime,
    pub ending_time: NaiveTime,
    pub name: String,
    pub location: String,
    pub ages: String,
    pub total_open: Option<i64>,
    pub action_link_href: String,
    pub action_link_label: String,
}

/// Result of expanding an activity's pattern blocks.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Events sorted ascending by `(date, starting_time, name)`, with no
    /// duplicate `(activity_id, date, starting_time)` tuples.
    pub events: Vec<CalendarEvent>,
    /// Blocks that were excluded because their data was unparseable.
    pub skipped: Vec<ScheduleDataError>,
}

/// Expand all of an activity's pattern blocks into concrete events within
/// `window`. Deterministic and side-effect-free.
///
/// Duplicate `(activity_id, date, starting_time)` tuples across blocks
/// (malformed upstream data sometimes repeats blocks) collapse to the
/// first occurrence.
pub fn expand(activity: &ActivityItem, patterns: &[ActivityPattern], window: DateRange) -> Expansion {
    let mut expansion = Expansion::default();
    let mut seen: HashSet<(ActivityId, NaiveDate, NaiveTime)> = HashSet::new();

    for pattern in patterns {
        match expand_block(activity, pattern, window) {
            Ok(events) => {
                for event in events {
                    if seen.insert((event.activity_id, event.date, event.starting_time)) {
                        expansion.events.push(event);
                    }
                }
            }
            Err(err) => expansion.skipped.push(err),
        }
    }

    sort_events(&mut expansion.events);
    expansion
}

/// Sort events by the canonical `(date, starting_time, name)` key.
/// Stable, so ties beyond the key keep their input order.
pub fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| {
        (a.date, a.starting_time, a.name.as_str()).cmp(&(b.date, b.starting_time, b.name.as_str()))
    });
}

/// Expand one pattern block. Fails as a unit when the block's own data is
/// unparseable so a single bad block never contributes partial garbage.
fn expand_block(
    activity: &ActivityItem,
    pattern: &ActivityPattern,
    window: DateRange,
) -> Result<Vec<CalendarEvent>, ScheduleDataError> {
    let (Some(begin), Some(end)) = (
        parse_iso_date(&pattern.beginning_date),
        parse_iso_date(&pattern.ending_date),
    ) else {
        return Err(ScheduleDataError::DateBounds {
            activity_id: activity.id,
            beginning: pattern.beginning_date.clone(),
            ending: pattern.ending_date.clone(),
        });
    };

    let slots = parse_slots(activity.id, pattern)?;
    let exceptions = exception_dates(pattern);
    let weeks_of_month = parse_weeks_of_month(&pattern.weeks_of_month);

    // Intersect the block's range with the display window.
    let lo = begin.max(window.start);
    let hi = end.min(window.end);

    let mut events = Vec::new();
    let mut date = lo;
    while date <= hi {
        if !exceptions.contains(&date) && matches_weeks_of_month(date, weeks_of_month.as_ref()) {
            for slot in &slots {
                if slot.weekdays.contains(&date.weekday()) {
                    events.push(CalendarEvent {
                        activity_id: activity.id,
                        date,
                        starting_time: slot.starting_time,
                        ending_time: slot.ending_time,
                        name: activity.name.clone(),
                        location: activity
                            .location
                            .as_ref()
                            .map(|l| l.label.clone())
                            .unwrap_or_default(),
                        ages: activity.ages.clone(),
                        total_open: activity.total_open,
                        action_link_href: activity
                            .action_link
                            .as_ref()
                            .map(|l| l.href.clone())
                            .unwrap_or_default(),
                        action_link_label: activity
                            .action_link
                            .as_ref()
                            .map(|l| l.label.clone())
                            .unwrap_or_else(|| "Enroll".to_string()),
                    });
                }
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(events)
}

/// A parsed time-slot: which weekdays, at what times.
struct Slot {
    weekdays: Vec<Weekday>,
    starting_time: NaiveTime,
    ending_time: NaiveTime,
}

/// Parse a block's time-slots. Slots with a blank starting time are
/// dropped (the upstream sends those for to-be-announced meetings); a
/// malformed weekday list or time string fails the block.
fn parse_slots(
    activity_id: ActivityId,
    pattern: &ActivityPattern,
) -> Result<Vec<Slot>, ScheduleDataError> {
    let mut slots = Vec::new();
    for pd in &pattern.pattern_dates {
        if pd.starting_time.is_empty() {
            continue;
        }

        let weekdays = parse_weekdays(&pd.weekdays);
        if weekdays.is_empty() {
            return Err(ScheduleDataError::Weekdays {
                activity_id,
                weekdays: pd.weekdays.clone(),
            });
        }

        let starting_time = parse_time(&pd.starting_time).ok_or_else(|| ScheduleDataError::Time {
            activity_id,
            value: pd.starting_time.clone(),
        })?;
        let ending_time = parse_time(&pd.ending_time).ok_or_else(|| ScheduleDataError::Time {
            activity_id,
            value: pd.ending_time.clone(),
        })?;

        slots.push(Slot {
            weekdays,
            starting_time,
            ending_time,
        });
    }
    Ok(slots)
}

/// Collect a block's exception dates. Entries arrive as ISO strings or
/// `{"date": "..."}` objects; anything else is ignored.
fn exception_dates(pattern: &ActivityPattern) -> HashSet<NaiveDate> {
    let mut dates = HashSet::new();
    for entry in &pattern.exception_dates {
        let raw = match entry {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(map) => map.get("date").and_then(|v| v.as_str()),
            _ => None,
        };
        if let Some(date) = raw.and_then(parse_iso_date) {
            dates.insert(date);
        }
    }
    dates
}

/// Parse an ISO date string (`YYYY-MM-DD`, longer strings truncated).
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a weekdays string like `"Mon, Wed, Fri"`. Unrecognized parts are
/// skipped; the caller decides whether an empty result is an error.
pub fn parse_weekdays(weekdays: &str) -> Vec<Weekday> {
    weekdays
        .split(',')
        .filter_map(|part| {
            let key = part.trim().to_ascii_lowercase();
            match key.get(..3)? {
                "mon" => Some(Weekday::Mon),
                "tue" => Some(Weekday::Tue),
                "wed" => Some(Weekday::Wed),
                "thu" => Some(Weekday::Thu),
                "fri" => Some(Weekday::Fri),
                "sat" => Some(Weekday::Sat),
                "sun" => Some(Weekday::Sun),
                _ => None,
            }
        })
        .collect()
}

/// Parse a meeting time in upstream `HH:MM:SS` or bare `HH:MM` form.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse a `weeks_of_month` filter string like `"1, 3"`. Empty or
/// digit-free strings mean "every week".
fn parse_weeks_of_month(s: &str) -> Option<HashSet<u32>> {
    let weeks: HashSet<u32> = s
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    if weeks.is_empty() {
        None
    } else {
        Some(weeks)
    }
}

/// Is `date` the n-th occurrence of its weekday in its month, for some n
/// in the filter? `None` means no filter.
fn matches_weeks_of_month(date: NaiveDate, weeks: Option<&HashSet<u32>>) -> bool {
    match weeks {
        None => true,
        Some(weeks) => weeks.contains(&((date.day() - 1) / 7 + 1)),
    }
}
