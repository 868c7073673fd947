//! Payload models for the ActiveNet activity endpoints.
//!
//! These mirror the upstream JSON shapes loosely: every non-identifying
//! field carries a default and unknown fields are ignored, so a minor
//! upstream schema drift does not break deserialization. Only the fields
//! that identify a record (`id`, `activity_id`) are required -- a payload
//! missing those is rejected at the client boundary as a protocol error.

use serde::{Deserialize, Serialize};

use crate::types::ActivityId;

/// A link-shaped upstream object. Reused for enrollment buttons, fee
/// links, and (oddly) facility labels -- `label` holds the facility name
/// when used as a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLink {
    pub href: String,
    pub label: String,
    #[serde(rename = "type")]
    pub link_type: i64,
    pub unit: String,
}

/// One row of an activity search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: ActivityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Activity number, e.g. `"1201.101"`.
    #[serde(default)]
    pub number: String,
    /// ISO date, e.g. `"2026-03-30"`.
    #[serde(default)]
    pub date_range_start: String,
    /// ISO date, e.g. `"2026-04-03"`.
    #[serde(default)]
    pub date_range_end: String,
    /// `.label` holds the facility name.
    #[serde(default)]
    pub location: Option<ActionLink>,
    /// Age-range text, e.g. `"5 - 11y 11m"`.
    #[serde(default)]
    pub ages: String,
    /// Spots still available.
    #[serde(default)]
    pub total_open: Option<i64>,
    #[serde(default)]
    pub already_enrolled: Option<i64>,
    /// `.href` links to the fee details page.
    #[serde(default)]
    pub fee: Option<ActionLink>,
    pub action_link: Option<ActionLink>,
    #[serde(default)]
    pub detail_url: String,
}

/// `body` payload of `POST /activities/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityListBody {
    pub activity_items: Vec<ActivityItem>,
}

/// Search filter payload sent in the body of `POST /activities/list`.
///
/// The upstream expects every field present, so everything defaults.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySearchPattern {
    pub activity_select_param: i64,
    pub activity_keyword: String,
    pub center_ids: Vec<i64>,
    pub activity_category_ids: Vec<i64>,
    pub activity_type_ids: Vec<i64>,
    pub season_ids: Vec<i64>,
    pub instructor_ids: Vec<i64>,
    pub site_ids: Vec<i64>,
    pub geographic_area_ids: Vec<i64>,
    pub activity_department_ids: Vec<i64>,
    pub activity_other_category_ids: Vec<i64>,
    pub child_season_ids: Vec<i64>,
    pub skills: Vec<serde_json::Value>,
    pub days_of_week: Option<Vec<i64>>,
    pub time_after_str: String,
    pub time_before_str: String,
    pub date_after: String,
    pub date_before: String,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub open_spots: Option<i64>,
    pub activity_id: Option<ActivityId>,
    pub for_map: bool,
    pub custom_price_from: String,
    pub custom_price_to: String,
}

impl Default for ActivitySearchPattern {
    fn default() -> Self {
        Self {
            // 2 = "activities available for enrollment" in the upstream UI.
            activity_select_param: 2,
            activity_keyword: String::new(),
            center_ids: Vec::new(),
            activity_category_ids: Vec::new(),
            activity_type_ids: Vec::new(),
            season_ids: Vec::new(),
            instructor_ids: Vec::new(),
            site_ids: Vec::new(),
            geographic_area_ids: Vec::new(),
            activity_department_ids: Vec::new(),
            activity_other_category_ids: Vec::new(),
            child_season_ids: Vec::new(),
            skills: Vec::new(),
            days_of_week: None,
            time_after_str: String::new(),
            time_before_str: String::new(),
            date_after: String::new(),
            date_before: String::new(),
            min_age: None,
            max_age: None,
            open_spots: None,
            activity_id: None,
            for_map: false,
            custom_price_from: String::new(),
            custom_price_to: String::new(),
        }
    }
}

/// Full request body for `POST /activities/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySearchRequest {
    pub activity_search_pattern: ActivitySearchPattern,
    /// Always an empty object; the upstream rejects `null` here.
    pub activity_transfer_pattern: serde_json::Map<String, serde_json::Value>,
}

impl ActivitySearchRequest {
    pub fn new(pattern: ActivitySearchPattern) -> Self {
        Self {
            activity_search_pattern: pattern,
            activity_transfer_pattern: serde_json::Map::new(),
        }
    }
}

/// Filter option ids arrive as either strings or integers depending on
/// the filter family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterId {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for FilterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterId::Int(id) => write!(f, "{id}"),
            FilterId::Str(id) => write!(f, "{id}"),
        }
    }
}

/// One selectable option in the search filter UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: FilterId,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub name: String,
}

impl FilterOption {
    /// The upstream populates `desc` for some families and `name` for
    /// others; fall back to the id when both are blank.
    pub fn display_name(&self) -> String {
        if !self.desc.is_empty() {
            self.desc.clone()
        } else if !self.name.is_empty() {
            self.name.clone()
        } else {
            self.id.to_string()
        }
    }
}

/// `body` payload of `GET /activities/filters`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFilterOptions {
    pub instructors: Vec<FilterOption>,
    pub centers: Vec<FilterOption>,
    pub seasons: Vec<FilterOption>,
    pub categories: Vec<FilterOption>,
    pub activity_types: Vec<FilterOption>,
    pub sites: Vec<FilterOption>,
    pub geographic_areas: Vec<FilterOption>,
    pub skills: Vec<FilterOption>,
}

/// One weekday/time rule inside a pattern block, e.g.
/// `{"weekdays": "Tue, Thu", "starting_time": "16:30:00", "ending_time": "16:55:00"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDate {
    pub weekdays: String,
    pub starting_time: String,
    pub ending_time: String,
}

/// One recurring-meeting pattern block: a contiguous date range plus
/// weekday/time rules. An activity may have several blocks (different
/// weekdays in different date ranges).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPattern {
    pub beginning_date: String,
    pub ending_date: String,
    /// Comma-separated week-of-month filter, e.g. `"1, 3"` = 1st and 3rd
    /// occurrence of the weekday in each month. Empty = every week.
    pub weeks_of_month: String,
    /// Excluded dates. The upstream emits either plain ISO strings or
    /// `{"date": "..."}` objects here; kept raw and interpreted by the
    /// schedule expander.
    pub exception_dates: Vec<serde_json::Value>,
    pub pattern_dates: Vec<PatternDate>,
}

/// Enrollment windows attached to the meeting-dates payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentDatetimes {
    pub first_daytime_internet: Option<String>,
    pub first_daytime_internet_nonresidents: Option<String>,
    pub first_daytime_internet_members: Option<String>,
    pub last_daytime_internet: Option<String>,
    pub for_drop_in_activity: bool,
}

/// `body.meeting_and_registration_dates` payload of
/// `GET /activity/detail/meetingandregistrationdates/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingAndRegistrationDates {
    pub activity_id: ActivityId,
    #[serde(default)]
    pub no_meeting_dates: bool,
    #[serde(default)]
    pub activity_patterns: Vec<ActivityPattern>,
    #[serde(default)]
    pub priority_enrollment_datetimes: Option<EnrollmentDatetimes>,
    /// Shape varies by deployment; kept raw.
    #[serde(default)]
    pub enrollment_datetimes: Option<Vec<serde_json::Value>>,
}

/// An instructor listed on an activity detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instructor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub is_primary_instructor: bool,
    pub email: String,
    pub bio: String,
    pub notes: String,
    pub avatar: String,
    pub phone: String,
}

/// `body.detail` payload of `GET /activity/detail/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub activity_id: ActivityId,
    #[serde(default)]
    pub activity_name: String,
    #[serde(default)]
    pub activity_number: String,
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub season_name: String,
    #[serde(default)]
    pub term_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub first_date: String,
    #[serde(default)]
    pub last_date: String,
    #[serde(default)]
    pub facilities: Vec<serde_json::Value>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub online_notes: String,
}

/// One line item of a price quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceDetail {
    pub price: String,
    pub description: String,
}

/// One named price list for an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceInfo {
    pub list_name: String,
    pub activity_name: String,
    pub details: Vec<PriceDetail>,
}

/// `body` payload of `GET /activity/detail/estimateprice/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatedPrice {
    pub show_price_info_online: bool,
    pub estimate_price: String,
    pub prices: Vec<PriceInfo>,
    pub free: bool,
    pub simple_fee: bool,
    pub is_package: bool,
}

impl Default for EstimatedPrice {
    fn default() -> Self {
        Self {
            show_price_info_online: true,
            estimate_price: String::new(),
            prices: Vec::new(),
            free: false,
            simple_fee: false,
            is_package: false,
        }
    }
}

/// `body` payload of `GET /activity/detail/buttonstatus/{id}` -- the
/// state of the enroll button (opens later, waitlist, etc.).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonStatus {
    pub activity_online_start_time: String,
    pub action_link: Option<ActionLink>,
    pub time_remaining: i64,
    pub notification: String,
}
