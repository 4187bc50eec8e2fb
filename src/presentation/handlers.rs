// HTTP request handlers
use crate::application::controller::SelectionUpdate;
use crate::domain::dashboard::DashboardView;
use crate::domain::page::Page;
use crate::domain::pair::Pair;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct PageRequest {
    pub page: Page,
}

#[derive(Deserialize)]
pub struct DescriptionBody {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub added: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Render the current page and consume the pending message
pub async fn get_view(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>, ApiError> {
    let view = state.controller().render()?;
    Ok(Json(view))
}

pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> Json<RefreshResponse> {
    let refresh = state.controller().apply_selection(update);
    Json(RefreshResponse { refresh })
}

pub async fn change_page(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageRequest>,
) -> Json<RefreshResponse> {
    let refresh = state.controller().change_page(request.page);
    Json(RefreshResponse { refresh })
}

pub async fn list_pairs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Pair>>, ApiError> {
    Ok(Json(state.store.get_pairs()?))
}

/// Pair manager upload: CSV in the body, name and description in the query
pub async fn import_pair(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Json<SubmitResponse> {
    let file = (!body.trim().is_empty()).then_some(body.as_bytes());

    let mut controller = state.controller();
    let added = controller.submit_new_pair(file, &query.name, &query.description);
    let message = controller.message().map(str::to_string);

    Json(SubmitResponse { added, message })
}

pub async fn add_demo_pair(State(state): State<Arc<AppState>>) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .controller()
        .add_predefined_pair(&mut rand::thread_rng())?;
    Ok(Json(CountResponse { count }))
}

pub async fn update_pair(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
    Json(body): Json<DescriptionBody>,
) -> Result<StatusCode, ApiError> {
    state
        .controller()
        .update_pair_description(&query.name, &body.description)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_pair(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.controller().delete_selected_pair(&query.name)?;
    Ok(Json(CountResponse { count }))
}
