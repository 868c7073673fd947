//! Calendar month-grid assembly for the browse UI.
//!
//! Converts expanded [`CalendarEvent`]s into month/week/day rows shaped
//! for a calendar rendering. Pure: `today` is an explicit parameter.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime};

use crate::activity::{ActivityItem, MeetingAndRegistrationDates};
use crate::schedule::{expand, parse_iso_date, CalendarEvent, DateRange, Expansion};

/// Palette of 20 distinct colors for activity pills on the calendar.
/// Stable per activity position, so with the default page size of 20
/// every activity on a page gets a unique color.
pub const PILL_COLORS: [&str; 20] = [
    "#1a5276", // navy
    "#117a65", // teal
    "#784212", // brown
    "#6c3483", // purple
    "#1a618f", // blue
    "#922b21", // red
    "#7d6608", // olive
    "#1e8449", // green
    "#d35400", // orange
    "#2e4053", // slate
    "#148f77", // cyan
    "#b03a2e", // crimson
    "#1f618d", // steel blue
    "#7b241c", // maroon
    "#196f3d", // forest
    "#a04000", // rust
    "#4a235a", // plum
    "#0e6655", // dark teal
    "#7e5109", // bronze
    "#2874a6", // cobalt
];

/// Stable color tag for the activity at `index` in the result page.
/// The same input position always yields the same color.
pub fn pill_color(index: usize) -> &'static str {
    PILL_COLORS[index % PILL_COLORS.len()]
}

/// One cell of the month grid. Cells outside the month are blank
/// placeholders (`in_month == false`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CalendarDay {
    /// Day of month, `0` for padding cells.
    pub day: u32,
    pub in_month: bool,
    /// ISO date, empty for padding cells.
    pub iso_date: String,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

impl CalendarDay {
    fn blank() -> Self {
        Self {
            day: 0,
            in_month: false,
            iso_date: String::new(),
            is_today: false,
            events: Vec::new(),
        }
    }
}

/// One month of the calendar: Monday-first weeks of seven cells each.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Display name, e.g. `"March 2026"`.
    pub name: String,
    pub weeks: Vec<Vec<CalendarDay>>,
}

/// Expand one activity's meeting patterns, with the upstream's fallback:
/// when there is no meeting info (or the patterns produce nothing), the
/// activity is pinned to its `date_range_start` so it still shows up on
/// the calendar.
pub fn activity_events(
    activity: &ActivityItem,
    meeting: Option<&MeetingAndRegistrationDates>,
    window: DateRange,
) -> Expansion {
    let mut expansion = match meeting {
        Some(info) if !info.no_meeting_dates => expand(activity, &info.activity_patterns, window),
        _ => Expansion::default(),
    };

    if expansion.events.is_empty() {
        if let Some(start) = parse_iso_date(&activity.date_range_start) {
            if window.contains(start) {
                expansion.events.push(CalendarEvent {
                    activity_id: activity.id,
                    date: start,
                    starting_time: NaiveTime::MIN,
                    ending_time: NaiveTime::MIN,
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

    expansion
}

/// Build the month grids spanning the first through last event date.
/// Returns an empty list when there are no events.
pub fn build_calendar_months(events: &[CalendarEvent], today: NaiveDate) -> Vec<CalendarMonth> {
    if events.is_empty() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event.clone());
    }

    // BTreeMap keeps dates ordered, so bounds are the first and last keys.
    let bounds = by_date.keys().next().zip(by_date.keys().next_back());
    let (Some(first_month), Some(last_month)) = (
        bounds.and_then(|(earliest, _)| earliest.with_day(1)),
        bounds.and_then(|(_, latest)| latest.with_day(1)),
    ) else {
        return Vec::new();
    };

    let mut months = Vec::new();
    let mut cursor = first_month;
    while cursor <= last_month {
        months.push(build_month(cursor, &by_date, today));
        cursor = cursor + Months::new(1);
    }

    months
}

/// Build a single month grid of Monday-first weeks.
fn build_month(
    first_of_month: NaiveDate,
    by_date: &BTreeMap<NaiveDate, Vec<CalendarEvent>>,
    today: NaiveDate,
) -> CalendarMonth {
    let year = first_of_month.year();
    let month = first_of_month.month();

    // Walk back to the Monday on or before the 1st.
    let mut cursor = first_of_month
        - Duration::days(first_of_month.weekday().num_days_from_monday() as i64);

    let mut weeks = Vec::new();
    loop {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            if cursor.month() == month {
                week.push(CalendarDay {
                    day: cursor.day(),
                    in_month: true,
                    iso_date: cursor.format("%Y-%m-%d").to_string(),
                    is_today: cursor == today,
                    events: by_date.get(&cursor).cloned().unwrap_or_default(),
                });
            } else {
                week.push(CalendarDay::blank());
            }
            cursor += Duration::days(1);
        }
        weeks.push(week);
        if cursor.month() != month || cursor.year() != year {
            break;
        }
    }

    CalendarMonth {
        year,
        month,
        name: first_of_month.format("%B %Y").to_string(),
        weeks,
    }
}
