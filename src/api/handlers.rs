// src/api/handlers.rs
//
// Request handlers. Thin: decode, call the service with the authenticated
// user, encode. Error-to-status mapping lives on AppError.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{Entry, EntryStatus, MediaItem, MediaSegment, MediaType, Note};
use crate::error::{AppError, AppResult};
use crate::providers::ProviderSearchResult;
use crate::services::{CreateManualItemRequest, CreateNoteRequest, UpdateEntryRequest};

use super::{AppState, Identity};

/// Distinguishes an absent JSON field (leave untouched) from an explicit
/// null (clear the value).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ----------------------------------------------------------------------
// Provider search
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    type_id: Option<Uuid>,
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    results: Vec<ProviderSearchResult>,
}

/// GET /api/import/search?typeId=&q=
pub async fn search(
    Identity(user): Identity,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let (type_id, query) = match (params.type_id, params.q) {
        (Some(type_id), Some(q)) if !q.is_empty() => (type_id, q),
        _ => {
            return Err(AppError::Validation(
                "Missing typeId or q parameter".to_string(),
            ))
        }
    };

    let results = state.import.search(&user, type_id, &query).await?;
    Ok(Json(SearchResponse { results }))
}

// ----------------------------------------------------------------------
// Imports
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody {
    type_id: Uuid,
    external_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWithStatusBody {
    type_id: Uuid,
    external_id: String,
    status: EntryStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    item_id: Uuid,
    created: bool,
}

/// POST /api/items/import
pub async fn import_item(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<ImportBody>,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let outcome = state
        .import
        .import_item(&user, body.type_id, &body.external_id)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ImportResponse {
            item_id: outcome.item_id,
            created: outcome.created,
        }),
    ))
}

/// POST /api/items/import-with-status
pub async fn import_item_with_status(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<ImportWithStatusBody>,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let outcome = state
        .import
        .import_item_with_status(&user, body.type_id, &body.external_id, body.status)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ImportResponse {
            item_id: outcome.item_id,
            created: outcome.created,
        }),
    ))
}

// ----------------------------------------------------------------------
// Items
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    type_id: Uuid,
    title: String,
    subtitle: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsParams {
    type_id: Option<Uuid>,
}

/// POST /api/items
pub async fn create_item(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateItemBody>,
) -> AppResult<(StatusCode, Json<MediaItem>)> {
    let item = state.library.create_manual_item(
        &user,
        CreateManualItemRequest {
            type_id: body.type_id,
            title: body.title,
            subtitle: body.subtitle,
            description: body.description,
        },
    )?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items?typeId=
pub async fn list_items(
    Identity(user): Identity,
    State(state): State<AppState>,
    Query(params): Query<ListItemsParams>,
) -> AppResult<Json<Vec<MediaItem>>> {
    Ok(Json(state.library.list_items(&user, params.type_id)?))
}

/// GET /api/items/:id
pub async fn get_item(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<MediaItem>> {
    Ok(Json(state.library.get_item(&user, item_id)?))
}

/// DELETE /api/items/:id
pub async fn delete_item(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.library.delete_item(&user, item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/items/:id/entries
pub async fn list_entries(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<Entry>>> {
    Ok(Json(state.library.list_entries(&user, item_id)?))
}

/// GET /api/items/:id/segments
pub async fn list_segments(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<MediaSegment>>> {
    Ok(Json(state.library.list_segments(&user, item_id)?))
}

/// GET /api/items/:id/notes
pub async fn list_notes(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<Note>>> {
    Ok(Json(state.library.list_notes(&user, item_id)?))
}

// ----------------------------------------------------------------------
// Entries
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryBody {
    item_id: Uuid,
    status: EntryStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryBody {
    status: Option<EntryStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    recommend: Option<Option<bool>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    score: Option<Option<i32>>,
}

/// POST /api/entries
pub async fn create_entry(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateEntryBody>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    let entry = state.library.create_entry(&user, body.item_id, body.status)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH /api/entries/:id
pub async fn update_entry(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryBody>,
) -> AppResult<Json<Entry>> {
    let entry = state.library.update_entry(
        &user,
        UpdateEntryRequest {
            entry_id,
            status: body.status,
            recommend: body.recommend,
            score: body.score,
        },
    )?;
    Ok(Json(entry))
}

/// DELETE /api/entries/:id
pub async fn delete_entry(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.library.delete_entry(&user, entry_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------
// Notes & segments
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    item_id: Uuid,
    entry_id: Option<Uuid>,
    segment_id: Option<Uuid>,
    tag: Option<String>,
    body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSegmentBody {
    item_id: Uuid,
    title: String,
}

/// POST /api/notes
pub async fn create_note(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateNoteBody>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let note = state.library.create_note(
        &user,
        CreateNoteRequest {
            item_id: body.item_id,
            entry_id: body.entry_id,
            segment_id: body.segment_id,
            tag: body.tag,
            body: body.body,
        },
    )?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// POST /api/segments
pub async fn create_segment(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateSegmentBody>,
) -> AppResult<(StatusCode, Json<MediaSegment>)> {
    let segment = state.library.create_segment(&user, body.item_id, body.title)?;
    Ok((StatusCode::CREATED, Json(segment)))
}

// ----------------------------------------------------------------------
// Media types
// ----------------------------------------------------------------------

/// GET /api/types
pub async fn list_types(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MediaType>>> {
    Ok(Json(state.library.list_types(&user)?))
}

/// POST /api/types/seed
pub async fn seed_types(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MediaType>>> {
    state.library.seed_default_types(&user)?;
    Ok(Json(state.library.list_types(&user)?))
}
