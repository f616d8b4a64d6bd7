use crate::dto::{
    CreateRecordReq, HealthRes, ListInvestigationsRes, ListSectionsRes, MarkCompleteReq,
    OpenSessionReq, SectionRes, UpdateFieldReq, WizardRes,
};
use crate::state::AppState;
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use casenote_core::{SectionId, StoreError, WizardController, WizardError, WizardSession};
use casenote_ids::RecordId;
use std::sync::Arc;

type ApiError = (StatusCode, String);

/// Maps an engine error to the status reported to the client.
fn status_for(err: &WizardError) -> StatusCode {
    match err {
        WizardError::InvalidInput(_)
        | WizardError::UnknownSection(_)
        | WizardError::UnknownField(_) => StatusCode::BAD_REQUEST,
        WizardError::NotLoaded
        | WizardError::DeleteNotRequested
        | WizardError::InvalidTransition { .. } => StatusCode::CONFLICT,
        WizardError::Load(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        WizardError::Load(_)
        | WizardError::Save(_)
        | WizardError::DeleteDependents(_)
        | WizardError::DeleteRecord(_)
        | WizardError::InvalidRegistry(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: WizardError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("wizard error: {}", err);
    } else {
        tracing::debug!("rejected request: {}", err);
    }
    (status, err.to_string())
}

fn parse_record_id(raw: &str) -> Result<RecordId, ApiError> {
    RecordId::parse(raw).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

fn parse_section(raw: &str) -> Result<SectionId, ApiError> {
    raw.parse::<SectionId>().map_err(reject)
}

async fn open_session_for(state: &AppState, raw_id: &str) -> Result<Arc<WizardSession>, ApiError> {
    let id = parse_record_id(raw_id)?;
    state.session(id).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("no open session for record {}", id),
        )
    })
}

fn snapshot(controller: &mut WizardController) -> Json<WizardRes> {
    Json(WizardRes {
        view: controller.view(),
        events: controller.drain_events(),
    })
}

async fn respond(session: &WizardSession) -> Json<WizardRes> {
    snapshot(&mut *session.lock().await)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "casenote REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/sections",
    responses(
        (status = 200, description = "Section catalog in presentation order", body = ListSectionsRes)
    )
)]
/// Lists every registered section, whether or not it applies to any particular patient.
pub(crate) async fn list_sections(State(state): State<AppState>) -> Json<ListSectionsRes> {
    Json(ListSectionsRes {
        sections: state.registry().iter().map(SectionRes::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/records",
    request_body = CreateRecordReq,
    responses(
        (status = 201, description = "Blank record created and opened", body = WizardRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Starts a new encounter
///
/// Allocates a record id, saves a blank draft for it and opens a session on it.
#[axum::debug_handler]
pub(crate) async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordReq>,
) -> Result<(StatusCode, Json<WizardRes>), ApiError> {
    let id = RecordId::new();
    let session = state.new_session();
    {
        let mut controller = session.lock().await;
        controller.begin_new(id, req.patient).await.map_err(reject)?;
        controller.save().await.map_err(reject)?;
    }
    state.insert(id, session.clone()).await;

    tracing::info!("created record {}", id);
    Ok((StatusCode::CREATED, respond(&session).await))
}

#[utoipa::path(
    post,
    path = "/records/{id}/session",
    request_body = OpenSessionReq,
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record loaded", body = WizardRes),
        (status = 400, description = "Invalid record id"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Opens a wizard session on a stored record
///
/// Opening a record that already has a session only refreshes the patient descriptor;
/// in-progress edits are kept.
#[axum::debug_handler]
pub(crate) async fn open_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<OpenSessionReq>,
) -> Result<Json<WizardRes>, ApiError> {
    let id = parse_record_id(&id)?;

    let session = state.session_or_insert(id).await;
    if let Err(e) = session.open(id, req.patient).await {
        state.remove_unopened(id, &session).await;
        return Err(reject(e));
    }
    Ok(respond(&session).await)
}

#[utoipa::path(
    delete,
    path = "/records/{id}/session",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 204, description = "Pending edits saved and session closed"),
        (status = 404, description = "No open session"),
        (status = 500, description = "Pending edits could not be saved")
    )
)]
/// Closes a session, saving pending edits first
pub(crate) async fn close_session(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    let record_id = parse_record_id(&id)?;
    let session = open_session_for(&state, &id).await?;
    session.close().await.map_err(reject)?;
    state.remove(record_id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Current wizard state", body = WizardRes),
        (status = 404, description = "No open session")
    )
)]
/// Reads the wizard state of an open record
pub(crate) async fn get_view(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    Ok(respond(&session).await)
}

#[utoipa::path(
    put,
    path = "/records/{id}/fields/{name}",
    request_body = UpdateFieldReq,
    params(
        ("id" = String, Path, description = "Record id"),
        ("name" = String, Path, description = "Internal field name")
    ),
    responses(
        (status = 200, description = "Field updated; autosave armed", body = WizardRes),
        (status = 400, description = "Unknown field or value of the wrong kind"),
        (status = 404, description = "No open session")
    )
)]
/// Sets one field of the record
pub(crate) async fn update_field(
    State(state): State<AppState>,
    AxumPath((id, name)): AxumPath<(String, String)>,
    Json(req): Json<UpdateFieldReq>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    session.update_field(&name, req.value).await.map_err(reject)?;
    Ok(respond(&session).await)
}

#[utoipa::path(
    post,
    path = "/records/{id}/sections/{section}/complete",
    request_body = MarkCompleteReq,
    params(
        ("id" = String, Path, description = "Record id"),
        ("section" = String, Path, description = "Section id")
    ),
    responses(
        (status = 200, description = "Completion flag set", body = WizardRes),
        (status = 400, description = "Unknown section"),
        (status = 404, description = "No open session")
    )
)]
/// Marks a section complete or incomplete
pub(crate) async fn mark_complete(
    State(state): State<AppState>,
    AxumPath((id, section)): AxumPath<(String, String)>,
    Json(req): Json<MarkCompleteReq>,
) -> Result<Json<WizardRes>, ApiError> {
    let section = parse_section(&section)?;
    let session = open_session_for(&state, &id).await?;
    session
        .mark_complete(section, req.completed)
        .await
        .map_err(reject)?;
    Ok(respond(&session).await)
}

#[utoipa::path(
    post,
    path = "/records/{id}/next",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Moved forward, or already on the last section", body = WizardRes),
        (status = 404, description = "No open session")
    )
)]
/// Moves to the next visible section and saves
pub(crate) async fn go_next(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.go_next().await.map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/previous",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Moved back, or already on the first section", body = WizardRes),
        (status = 404, description = "No open session")
    )
)]
/// Moves to the previous visible section and saves
pub(crate) async fn go_previous(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.go_previous().await.map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/sections/{section}/visit",
    params(
        ("id" = String, Path, description = "Record id"),
        ("section" = String, Path, description = "Section id")
    ),
    responses(
        (status = 200, description = "Moved to the section", body = WizardRes),
        (status = 400, description = "Unknown or hidden section"),
        (status = 404, description = "No open session")
    )
)]
/// Jumps to a visible section and saves
pub(crate) async fn go_to_section(
    State(state): State<AppState>,
    AxumPath((id, section)): AxumPath<(String, String)>,
) -> Result<Json<WizardRes>, ApiError> {
    let section = parse_section(&section)?;
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.go_to_section(section).await.map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/save",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Saved", body = WizardRes),
        (status = 404, description = "No open session"),
        (status = 500, description = "Save failed; edits are kept")
    )
)]
/// Saves immediately
pub(crate) async fn save(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.save().await.map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/finalize",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record marked complete and saved", body = WizardRes),
        (status = 404, description = "No open session"),
        (status = 500, description = "Save failed; record is not finalized")
    )
)]
/// Marks the record complete and saves it
pub(crate) async fn finalize(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.finalize().await.map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/delete-request",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Deletion requested; awaiting confirmation", body = WizardRes),
        (status = 404, description = "No open session"),
        (status = 409, description = "Record cannot be deleted in its current state")
    )
)]
/// First step of deleting a record
pub(crate) async fn request_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.request_delete().map_err(reject)?;
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    delete,
    path = "/records/{id}/delete-request",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Pending deletion withdrawn", body = WizardRes),
        (status = 404, description = "No open session")
    )
)]
/// Withdraws a pending delete request
pub(crate) async fn cancel_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let session = open_session_for(&state, &id).await?;
    let mut controller = session.lock().await;
    controller.cancel_delete();
    Ok(snapshot(&mut controller))
}

#[utoipa::path(
    post,
    path = "/records/{id}/delete-confirm",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record and its dependents deleted", body = WizardRes),
        (status = 404, description = "No open session"),
        (status = 409, description = "Deletion was not requested"),
        (status = 500, description = "Deletion failed; record is kept")
    )
)]
/// Second step of deleting a record
///
/// Dependents (investigations) are removed first. On success the session is closed.
pub(crate) async fn confirm_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<WizardRes>, ApiError> {
    let record_id = parse_record_id(&id)?;
    let session = open_session_for(&state, &id).await?;

    let res = {
        let mut controller = session.lock().await;
        controller.confirm_delete().await.map_err(reject)?;
        snapshot(&mut controller)
    };

    state.remove(record_id).await;
    session.close().await.map_err(reject)?;
    Ok(res)
}

#[utoipa::path(
    get,
    path = "/records/{id}/investigations",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Investigations, oldest first", body = ListInvestigationsRes),
        (status = 400, description = "Invalid record id"),
        (status = 500, description = "Internal server error")
    )
)]
/// Lists the investigations attached to a record
pub(crate) async fn list_investigations(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ListInvestigationsRes>, ApiError> {
    let id = parse_record_id(&id)?;
    match state.investigations().list(id).await {
        Ok(investigations) => Ok(Json(ListInvestigationsRes { investigations })),
        Err(e) => {
            tracing::error!("List investigations error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
        }
    }
}
