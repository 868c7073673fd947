//! Typed activity operations over an [`ActiveNetClient`].
//!
//! Primary fetches (filters, search, detail) propagate their errors.
//! Enrichment fetches (meeting dates, prices, button status) are only
//! needed for calendar/detail decoration, so they degrade to `None` --
//! logged once with the error kind and activity id, never with cookies
//! or tokens.

use std::collections::HashMap;

use futures::future::join_all;
use serde::de::DeserializeOwned;

use samo_core::activity::{
    ActivityDetail, ActivityFilterOptions, ActivityItem, ActivityListBody, ActivitySearchPattern,
    ActivitySearchRequest, ButtonStatus, EstimatedPrice, MeetingAndRegistrationDates,
};
use samo_core::envelope::PageInfo;
use samo_core::types::ActivityId;

use crate::client::{ActiveNetClient, PageRequest};
use crate::error::UpstreamError;

/// Fetch the filter options for the activity search UI.
pub async fn get_filters(client: &ActiveNetClient) -> Result<ActivityFilterOptions, UpstreamError> {
    let envelope = client.get("/activities/filters", &[]).await?;
    parse_body(envelope.body, "filter options")
}

/// Search for activities. Returns the matching page of items plus the
/// pagination info echoed in the envelope headers. An empty-result
/// response (`"0001"`) yields an empty page, not an error.
pub async fn search(
    client: &ActiveNetClient,
    pattern: ActivitySearchPattern,
    page_number: i64,
) -> Result<(Vec<ActivityItem>, PageInfo), UpstreamError> {
    let request = ActivitySearchRequest::new(pattern);
    let envelope = client
        .post(
            "/activities/list",
            &request,
            Some(PageRequest {
                page_number,
                records_per_page: 20,
            }),
        )
        .await?;

    let page_info = envelope.headers.page_info.clone();
    let body: ActivityListBody = parse_body(envelope.body, "activity list")?;
    Ok((body.activity_items, page_info))
}

/// Fetch the meeting-date patterns for one activity. Degrades to `None`
/// on any failure -- the caller renders without the calendar detail.
pub async fn get_meeting_dates(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Option<MeetingAndRegistrationDates> {
    match fetch_meeting_dates(client, activity_id).await {
        Ok(meeting) => meeting,
        Err(err) => {
            tracing::warn!(activity_id, error = %err, "meeting dates unavailable, continuing without");
            None
        }
    }
}

/// Fetch meeting dates for many activities concurrently. Activities
/// whose fetch failed or returned nothing are simply absent from the map.
pub async fn get_meeting_dates_batch(
    client: &ActiveNetClient,
    activity_ids: &[ActivityId],
) -> HashMap<ActivityId, MeetingAndRegistrationDates> {
    let results = join_all(
        activity_ids
            .iter()
            .map(|id| get_meeting_dates(client, *id)),
    )
    .await;

    activity_ids
        .iter()
        .copied()
        .zip(results)
        .filter_map(|(id, meeting)| meeting.map(|m| (id, m)))
        .collect()
}

/// Fetch the full detail record for one activity. `Ok(None)` when the
/// upstream reports an empty result or omits the record.
pub async fn get_activity_detail(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Result<Option<ActivityDetail>, UpstreamError> {
    let envelope = client
        .get(&format!("/activity/detail/{activity_id}"), &[])
        .await?;
    if envelope.headers.is_empty_result() {
        return Ok(None);
    }

    let Some(raw) = envelope.body.get("detail") else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let detail = serde_json::from_value(raw.clone())
        .map_err(|e| UpstreamError::Protocol(format!("activity detail did not parse: {e}")))?;
    Ok(Some(detail))
}

/// Fetch the estimated price for one activity, degrading to `None`.
pub async fn get_estimated_price(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Option<EstimatedPrice> {
    match fetch_estimated_price(client, activity_id).await {
        Ok(price) => price,
        Err(err) => {
            tracing::warn!(activity_id, error = %err, "price estimate unavailable, continuing without");
            None
        }
    }
}

/// Fetch prices for many activities concurrently.
pub async fn get_prices_batch(
    client: &ActiveNetClient,
    activity_ids: &[ActivityId],
) -> HashMap<ActivityId, EstimatedPrice> {
    let results = join_all(
        activity_ids
            .iter()
            .map(|id| get_estimated_price(client, *id)),
    )
    .await;

    activity_ids
        .iter()
        .copied()
        .zip(results)
        .filter_map(|(id, price)| price.map(|p| (id, p)))
        .collect()
}

/// Fetch the enroll-button state for one activity, degrading to `None`.
pub async fn get_button_status(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Option<ButtonStatus> {
    let path = format!("/activity/detail/buttonstatus/{activity_id}");
    let result: Result<Option<ButtonStatus>, UpstreamError> = async {
        let envelope = client.get(&path, &[]).await?;
        if envelope.headers.is_empty_result() || envelope.body.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_body(envelope.body, "button status")?))
    }
    .await;

    match result {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(activity_id, error = %err, "button status unavailable, continuing without");
            None
        }
    }
}

// ---- private helpers ----

async fn fetch_meeting_dates(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Result<Option<MeetingAndRegistrationDates>, UpstreamError> {
    let envelope = client
        .get(
            &format!("/activity/detail/meetingandregistrationdates/{activity_id}"),
            &[],
        )
        .await?;
    if envelope.headers.is_empty_result() {
        return Ok(None);
    }

    let Some(raw) = envelope.body.get("meeting_and_registration_dates") else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let meeting = serde_json::from_value(raw.clone())
        .map_err(|e| UpstreamError::Protocol(format!("meeting dates did not parse: {e}")))?;
    Ok(Some(meeting))
}

async fn fetch_estimated_price(
    client: &ActiveNetClient,
    activity_id: ActivityId,
) -> Result<Option<EstimatedPrice>, UpstreamError> {
    let envelope = client
        .get(&format!("/activity/detail/estimateprice/{activity_id}"), &[])
        .await?;
    if envelope.headers.is_empty_result() || envelope.body.is_null() {
        return Ok(None);
    }
    Ok(Some(parse_body(envelope.body, "estimated price")?))
}

/// Deserialize an envelope body, treating a null/absent body as the
/// type's default (the upstream omits bodies on empty results).
fn parse_body<T>(body: serde_json::Value, what: &str) -> Result<T, UpstreamError>
where
    T: DeserializeOwned + Default,
{
    if body.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(body)
        .map_err(|e| UpstreamError::Protocol(format!("{what} payload did not parse: {e}")))
}
