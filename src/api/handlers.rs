//! Request handlers for the dashboard API.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthService;
use crate::models::{Vitals, VitalsRecord};
use crate::pipeline::{self, BandCounts, CriticalityFilter, SortKey, Thresholds, ViewParams};
use crate::report;
use crate::store::RecordStore;
use crate::trend::{TrendWindow, TREND_WINDOW_LEN};

use super::middleware::{Authenticated, MaybeAuthenticated};
use super::ApiError;

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: RecordStore,
    pub auth: AuthService,
    pub thresholds: Thresholds,
}

/// Credentials for login and registration.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub password: String,
}

/// Body of a save request from the capture form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordRequest {
    #[validate(length(min = 1, message = "Patient ID is required"))]
    pub patient_id: String,
    #[serde(default)]
    pub vitals: Vitals,
}

/// Query parameters of the list view.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub criticality: CriticalityFilter,
    #[serde(default)]
    pub sort: SortKey,
}

impl ListQuery {
    fn view_params(&self) -> ViewParams {
        ViewParams {
            search_id: self.search.clone(),
            criticality: self.criticality,
            sort_by: self.sort,
        }
    }
}

/// Filtered view plus aggregate counts, as consumed by the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub records: Vec<VitalsRecord>,
    #[serde(flatten)]
    pub counts: BandCounts,
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;
    let session = state.auth.register(&body.email, &body.password).await?;
    Ok(HttpResponse::Created().json(session))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Sessions are stateless; logout is acknowledged so the client discards
/// its token.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Logged out" }))
}

/// Append one observation. The patient id is validated before the store
/// is touched.
pub async fn add_record(
    state: web::Data<AppState>,
    user: Authenticated,
    body: web::Json<AddRecordRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let record = state
        .store
        .add_record(&user.0.id, &body.patient_id, body.vitals.clone())
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// The filtered, sorted view plus band counts over the full set.
/// Anonymous callers get an empty list and zero counts.
pub async fn list_records(
    state: web::Data<AppState>,
    user: MaybeAuthenticated,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = match &user.0 {
        Some(user) => state.store.records_for(&user.id).await?,
        None => Vec::new(),
    };

    let view = pipeline::apply_view(&records, &query.view_params(), &state.thresholds);
    let counts = pipeline::band_counts(&records, &state.thresholds);

    Ok(HttpResponse::Ok().json(ListResponse {
        records: view,
        counts,
    }))
}

/// Chart series over the most recent observations.
pub async fn trend_window(
    state: web::Data<AppState>,
    user: MaybeAuthenticated,
) -> Result<HttpResponse, ApiError> {
    let records = match &user.0 {
        Some(user) => state.store.records_for(&user.id).await?,
        None => Vec::new(),
    };

    let window = TrendWindow::build(&records, TREND_WINDOW_LEN, &state.thresholds);
    Ok(HttpResponse::Ok().json(window))
}

/// Summary report over the caller's records, listing the filtered view.
pub async fn export_summary(
    state: web::Data<AppState>,
    user: Authenticated,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = state.store.records_for(&user.0.id).await?;
    let view = pipeline::apply_view(&records, &query.view_params(), &state.thresholds);
    let document = report::summary_report(&records, &view, &state.thresholds, Utc::now());

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(document))
}

/// Printable sheet for one record, owner-scoped.
pub async fn export_record(
    state: web::Data<AppState>,
    user: Authenticated,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();
    let record = state
        .store
        .record_for(&user.0.id, &record_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Record not found".to_string()))?;

    let document = report::patient_report(&record, &state.thresholds, Utc::now());
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(document))
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
