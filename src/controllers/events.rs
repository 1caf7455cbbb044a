use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::AuthUser;
use crate::models::{event::parse_duration_minutes, Event};
use crate::schedule::{self, Status};
use crate::store;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events", post(create_event))
        .route("/events/{id}", put(update_event))
        .route("/events/{id}", delete(delete_event))
        .route("/dashboard", get(dashboard))
}

fn save_failed(e: crate::store::StoreError) -> (StatusCode, String) {
    tracing::error!("failed to save events: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Operation failed, please retry".to_string(),
    )
}

/// Load the caller's events with statuses refreshed and schedule order
/// applied.
async fn load_own_events(state: &AppState, user_id: u64) -> Vec<Event> {
    let mut events: Vec<Event> = state
        .store
        .load_events()
        .await
        .into_iter()
        .filter(|e| e.owner_user_id == user_id)
        .collect();

    let now = Local::now().naive_local();
    schedule::refresh_statuses(&mut events, now);
    schedule::sort_by_schedule(&mut events);
    events
}

// GET /api/events
async fn list_events(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let events = load_own_events(&state, user.user_id).await;
    Json(json!({
        "success": true,
        "count": events.len(),
        "events": events
    }))
}

// GET /api/dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> impl IntoResponse {
    let events = load_own_events(&state, user.user_id).await;

    let today = Local::now().date_naive();
    let today_events: Vec<&Event> = events
        .iter()
        .filter(|e| e.start().map(|s| s.date() == today).unwrap_or(false))
        .collect();

    Json(json!({
        "success": true,
        "username": user.username,
        "today": today_events,
        "events": events
    }))
}

// Form-shaped payload shared by create and update; duration arrives as a
// free-form string and degrades to 0 when non-numeric
#[derive(Debug, Deserialize)]
struct EventForm {
    title: String,
    date: String,
    time: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

// POST /api/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(form): Json<EventForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if form.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }

    let mut events = state.store.load_events().await;
    let event = Event {
        id: store::next_event_id(&events),
        title: form.title.trim().to_string(),
        datetime: Event::combine_datetime(&form.date, &form.time),
        date: form.date,
        time: form.time,
        location: form.location,
        duration_minutes: parse_duration_minutes(form.duration.as_deref().unwrap_or("")),
        notes: form.notes,
        owner_user_id: user.user_id,
        owner_email: user.email,
        reminder_sent: false,
        status: Status::default(),
    };
    let event_id = event.id;
    events.push(event);

    state.store.save_events(&events).await.map_err(save_failed)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "New schedule added!",
            "event": { "id": event_id }
        })),
    ))
}

// PUT /api/events/{id}
async fn update_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(event_id): Path<u64>,
    Json(form): Json<EventForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if form.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }

    let mut events = state.store.load_events().await;
    let event = events
        .iter_mut()
        .find(|e| e.id == event_id && e.owner_user_id == user.user_id)
        .ok_or((StatusCode::NOT_FOUND, "Schedule not found".to_string()))?;

    event.title = form.title.trim().to_string();
    event.datetime = Event::combine_datetime(&form.date, &form.time);
    event.date = form.date;
    event.time = form.time;
    event.location = form.location;
    event.duration_minutes = parse_duration_minutes(form.duration.as_deref().unwrap_or(""));
    event.notes = form.notes;
    // Every edit counts as a new occurrence, so the reminder becomes
    // eligible again even if the datetime did not change
    event.reminder_sent = false;

    state.store.save_events(&events).await.map_err(save_failed)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Schedule updated!" })),
    ))
}

// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(event_id): Path<u64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut events = state.store.load_events().await;
    let before = events.len();
    events.retain(|e| !(e.id == event_id && e.owner_user_id == user.user_id));

    if events.len() == before {
        return Err((StatusCode::NOT_FOUND, "Schedule not found".to_string()));
    }

    state.store.save_events(&events).await.map_err(save_failed)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Schedule deleted successfully!" })),
    ))
}
