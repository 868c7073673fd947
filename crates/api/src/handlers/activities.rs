//! Handlers for browsing activities: search/card view, calendar view,
//! and the single-activity detail page.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use samo_activenet::services;
use samo_core::activity::{
    ActivityDetail, ActivityFilterOptions, ActivityItem, ActivitySearchPattern, ButtonStatus,
    EstimatedPrice, MeetingAndRegistrationDates,
};
use samo_core::calendar::{activity_events, build_calendar_months, pill_color, CalendarMonth};
use samo_core::envelope::PageInfo;
use samo_core::schedule::{parse_iso_date, sort_events, DateRange};
use samo_core::types::ActivityId;

use crate::error::{AppError, AppResult};
use crate::middleware::session::SessionClient;
use crate::response::DataResponse;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /activities`.
///
/// Multi-value filters (`category_ids`, `center_ids`) arrive as
/// comma-separated lists.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrowseParams {
    pub q: String,
    pub date_after: String,
    pub date_before: String,
    pub category_ids: String,
    pub center_ids: String,
    pub show_full_details: bool,
    /// `card` or `calendar`.
    pub view: String,
    pub page: i64,
}

impl Default for BrowseParams {
    fn default() -> Self {
        Self {
            q: String::new(),
            date_after: String::new(),
            date_before: String::new(),
            category_ids: String::new(),
            center_ids: String::new(),
            show_full_details: false,
            view: "card".to_string(),
            page: 1,
        }
    }
}

/// Response payload for `GET /activities`.
#[derive(Debug, Serialize)]
pub struct BrowsePayload {
    pub activities: Vec<ActivityItem>,
    pub page_info: PageInfo,
    /// Absent when the filters fetch failed (non-essential).
    pub filters: Option<ActivityFilterOptions>,
    pub meeting_dates: HashMap<ActivityId, MeetingAndRegistrationDates>,
    pub prices: HashMap<ActivityId, EstimatedPrice>,
    /// Populated only for the calendar view.
    pub calendar_months: Vec<CalendarMonth>,
    /// Stable pill color per activity, keyed by activity id.
    pub pill_colors: HashMap<ActivityId, String>,
}

/// Response payload for `GET /activities/{id}`.
#[derive(Debug, Serialize)]
pub struct DetailPayload {
    pub detail: ActivityDetail,
    pub meeting_dates: Option<MeetingAndRegistrationDates>,
    pub price: Option<EstimatedPrice>,
    pub button_status: Option<ButtonStatus>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/activities
///
/// Browse and search activities. Filters and the search run
/// concurrently; meeting dates (and prices, for full details) are
/// batch-fetched only when the view needs them. A failed enrichment
/// degrades to absent fields; a failed search fails the request.
pub async fn browse(
    session: SessionClient,
    Query(params): Query<BrowseParams>,
) -> AppResult<Json<DataResponse<BrowsePayload>>> {
    let client = &session.client;

    let pattern = ActivitySearchPattern {
        activity_keyword: params.q.clone(),
        date_after: params.date_after.clone(),
        date_before: params.date_before.clone(),
        activity_category_ids: parse_id_list(&params.category_ids),
        center_ids: parse_id_list(&params.center_ids),
        ..Default::default()
    };

    // 1. Filters and search results in parallel.
    let (filters, search_result) = tokio::join!(
        services::get_filters(client),
        services::search(client, pattern, params.page),
    );

    // Filter options only decorate the search form; missing them is not
    // worth failing the page over.
    let filters = match filters {
        Ok(filters) => Some(filters),
        Err(err) => {
            tracing::warn!(error = %err, "filter options unavailable, continuing without");
            None
        }
    };

    // The activity list is the primary fetch: its failure is fatal to
    // this request (and only this request).
    let (activities, page_info) = search_result?;

    // 2. Enrichment, only when a view needs it.
    let need_meeting_dates = params.show_full_details || params.view == "calendar";
    let need_prices = params.show_full_details;
    let activity_ids: Vec<ActivityId> = activities.iter().map(|a| a.id).collect();

    let mut meeting_dates = HashMap::new();
    let mut prices = HashMap::new();
    if !activities.is_empty() {
        if need_meeting_dates && need_prices {
            let (m, p) = tokio::join!(
                services::get_meeting_dates_batch(client, &activity_ids),
                services::get_prices_batch(client, &activity_ids),
            );
            meeting_dates = m;
            prices = p;
        } else if need_meeting_dates {
            meeting_dates = services::get_meeting_dates_batch(client, &activity_ids).await;
        } else if need_prices {
            prices = services::get_prices_batch(client, &activity_ids).await;
        }
    }

    // 3. Calendar assembly (calendar view only).
    let calendar_months = if params.view == "calendar" {
        build_calendar(&params, &activities, &meeting_dates)
    } else {
        Vec::new()
    };

    let pill_colors = activities
        .iter()
        .enumerate()
        .map(|(index, activity)| (activity.id, pill_color(index).to_string()))
        .collect();

    Ok(Json(DataResponse {
        data: BrowsePayload {
            activities,
            page_info,
            filters,
            meeting_dates,
            prices,
            calendar_months,
            pill_colors,
        },
    }))
}

/// GET /api/v1/activities/{activity_id}
///
/// Full detail for a single activity. The four upstream fetches run
/// concurrently; only the detail record itself is required.
pub async fn activity_detail(
    session: SessionClient,
    Path(activity_id): Path<ActivityId>,
) -> AppResult<Json<DataResponse<DetailPayload>>> {
    let client = &session.client;

    let (detail, meeting_dates, price, button_status) = tokio::join!(
        services::get_activity_detail(client, activity_id),
        services::get_meeting_dates(client, activity_id),
        services::get_estimated_price(client, activity_id),
        services::get_button_status(client, activity_id),
    );

    let detail = detail?.ok_or(AppError::ActivityNotFound(activity_id))?;

    Ok(Json(DataResponse {
        data: DetailPayload {
            detail,
            meeting_dates,
            price,
            button_status,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand every activity's patterns and lay the events out as month
/// grids. Pattern blocks with unparseable data are logged (once each,
/// with the activity id) and excluded.
fn build_calendar(
    params: &BrowseParams,
    activities: &[ActivityItem],
    meeting_dates: &HashMap<ActivityId, MeetingAndRegistrationDates>,
) -> Vec<CalendarMonth> {
    let Some(window) = display_window(params, activities) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    for activity in activities {
        let expansion = activity_events(activity, meeting_dates.get(&activity.id), window);
        for err in &expansion.skipped {
            tracing::warn!(activity_id = activity.id, error = %err, "skipping unparseable pattern block");
        }
        events.extend(expansion.events);
    }
    sort_events(&mut events);

    build_calendar_months(&events, chrono::Utc::now().date_naive())
}

/// The date range to materialize events for: explicit `date_after`/
/// `date_before` filters when given, otherwise the span of the result
/// page's own date ranges.
fn display_window(params: &BrowseParams, activities: &[ActivityItem]) -> Option<DateRange> {
    let start = parse_iso_date(&params.date_after)
        .or_else(|| {
            activities
                .iter()
                .filter_map(|a| parse_iso_date(&a.date_range_start))
                .min()
        })?;
    let end = parse_iso_date(&params.date_before)
        .or_else(|| {
            activities
                .iter()
                .filter_map(|a| parse_iso_date(&a.date_range_end))
                .max()
        })?;

    (start <= end).then(|| DateRange::new(start, end))
}

/// Parse a comma-separated id list; non-numeric parts are dropped.
fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
