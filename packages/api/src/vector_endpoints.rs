//! Vector endpoints, all scoped by the owning node
//!
//! - `GET /node/:id/vector/:vector_id`
//! - `GET /node/:id/vectors` - paged, 404 when the node is missing
//! - `GET /node/:id/vectors/:ids`
//! - `POST /node/:id/vector` and `POST /node/:id/vectors`
//! - `POST /node/:id/vector/:vector_id` - 409 when it exists, else 404
//! - `PUT | PATCH | DELETE /node/:id/vector/:vector_id`

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use unionall_core::models::{DataRequestParams, NodeId, Vector, VectorId};

use crate::dto::{validate_all, VectorDto, VectorEdit};
use crate::http_error::{HttpError, RESOURCE_EXISTS, VALIDATION_ERROR, VECTOR_NOT_FOUND};
use crate::ids::{format_id_list, parse_id_list};
use crate::json_patch::{self, PatchOperation};
use crate::paging::{pagination_header, PageQuery};
use crate::AppState;

fn to_dtos(vectors: &[Vector]) -> Vec<VectorDto> {
    vectors.iter().map(VectorDto::from).collect()
}

async fn find_vector(
    state: &AppState,
    node_id: NodeId,
    vector_id: VectorId,
) -> Result<Vector, HttpError> {
    state
        .vectors
        .get_by_id(node_id, vector_id)
        .await?
        .ok_or_else(|| HttpError::vector_not_found(node_id, vector_id))
}

/// New vectors may only hang off an active node
async fn require_subject(state: &AppState, node_id: NodeId) -> Result<(), HttpError> {
    match state.nodes.get_by_id(node_id).await? {
        Some(_) => Ok(()),
        None => Err(HttpError::node_not_found(node_id)),
    }
}

async fn get_vector(
    State(state): State<AppState>,
    Path((node_id, vector_id)): Path<(NodeId, VectorId)>,
) -> Result<Json<VectorDto>, HttpError> {
    let vector = find_vector(&state, node_id, vector_id).await?;
    Ok(Json(VectorDto::from(&vector)))
}

async fn list_vectors(
    State(state): State<AppState>,
    Path(node_id): Path<NodeId>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpError> {
    let params = DataRequestParams::from(query);
    let vectors = state
        .vectors
        .list_by_subject(node_id, &params)
        .await?
        .ok_or_else(|| HttpError::node_not_found(node_id))?;
    let total = state.vectors.count_by_subject(node_id).await?;

    Ok(([pagination_header(total, &params)], Json(to_dtos(&vectors))).into_response())
}

async fn get_vector_set(
    State(state): State<AppState>,
    Path((node_id, ids)): Path<(NodeId, String)>,
) -> Result<Json<Vec<VectorDto>>, HttpError> {
    let ids = parse_id_list(&ids)?;
    let vectors = state
        .vectors
        .select_set(node_id, &ids)
        .await?
        .ok_or_else(|| {
            HttpError::new(
                format!(
                    "Not every vector in {} was found for node {}",
                    format_id_list(ids.iter().copied()),
                    node_id
                ),
                VECTOR_NOT_FOUND,
            )
        })?;

    Ok(Json(to_dtos(&vectors)))
}

async fn create_vector(
    State(state): State<AppState>,
    Path(node_id): Path<NodeId>,
    body: Result<Json<VectorEdit>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(edit) = body?;
    let valid = edit.validate().map_err(|e| HttpError::unprocessable(&e))?;
    require_subject(&state, node_id).await?;

    let saved = state
        .vectors
        .insert(valid.into_vector(node_id))
        .await?
        .ok_or_else(|| HttpError::persistence_failed("Failed to save new vector"))?;

    let location = format!("/node/{}/vector/{}", node_id, saved.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(VectorDto::from(&saved)),
    )
        .into_response())
}

async fn create_vector_set(
    State(state): State<AppState>,
    Path(node_id): Path<NodeId>,
    body: Result<Json<Vec<VectorEdit>>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(edits) = body?;
    let valid = validate_all(&edits, VectorEdit::validate).map_err(|failures| {
        HttpError::with_details("Request failed validation", VALIDATION_ERROR, failures.join("; "))
    })?;
    require_subject(&state, node_id).await?;

    let vectors: Vec<Vector> = valid.into_iter().map(|v| v.into_vector(node_id)).collect();
    let saved = state
        .vectors
        .insert_set(vectors)
        .await?
        .ok_or_else(|| HttpError::persistence_failed("Failed to save vector set"))?;

    let location = format!(
        "/node/{}/vectors/{}",
        node_id,
        format_id_list(saved.iter().map(|v| v.id()))
    );
    tracing::info!("Created vector set {}", location);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(to_dtos(&saved)),
    )
        .into_response())
}

async fn block_vector_creation(
    State(state): State<AppState>,
    Path((node_id, vector_id)): Path<(NodeId, VectorId)>,
) -> Result<StatusCode, HttpError> {
    find_vector(&state, node_id, vector_id).await?;
    Err(HttpError::new(
        format!("Vector {} already exists for node {}", vector_id, node_id),
        RESOURCE_EXISTS,
    ))
}

async fn put_vector(
    State(state): State<AppState>,
    Path((node_id, vector_id)): Path<(NodeId, VectorId)>,
    body: Result<Json<VectorEdit>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Json(edit) = body?;
    let valid = edit.validate().map_err(|e| HttpError::unprocessable(&e))?;

    let mut vector = find_vector(&state, node_id, vector_id).await?;
    valid.apply_to(&mut vector, node_id);

    state.vectors.update(vector).await?.ok_or_else(|| {
        HttpError::persistence_failed(format!(
            "Failed to update vector {} for node {}",
            vector_id, node_id
        ))
    })?;

    Ok(StatusCode::NO_CONTENT)
}

async fn patch_vector(
    State(state): State<AppState>,
    Path((node_id, vector_id)): Path<(NodeId, VectorId)>,
    body: Result<Json<Vec<PatchOperation>>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Json(operations) = body?;

    let mut vector = find_vector(&state, node_id, vector_id).await?;

    let mut projection = serde_json::to_value(VectorEdit::from_vector(&vector)).map_err(|e| {
        HttpError::with_details("Failed to project vector", "SERIALIZATION_ERROR", e.to_string())
    })?;
    json_patch::apply(&mut projection, &operations)?;

    let patched: VectorEdit = serde_json::from_value(projection).map_err(|e| {
        HttpError::with_details("Patched vector is not valid", VALIDATION_ERROR, e.to_string())
    })?;
    let valid = patched.validate().map_err(|e| HttpError::unprocessable(&e))?;
    valid.apply_to(&mut vector, node_id);

    state.vectors.update(vector).await?.ok_or_else(|| {
        HttpError::persistence_failed(format!(
            "Failed to patch vector {} for node {}",
            vector_id, node_id
        ))
    })?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_vector(
    State(state): State<AppState>,
    Path((node_id, vector_id)): Path<(NodeId, VectorId)>,
) -> Result<StatusCode, HttpError> {
    let mut vector = find_vector(&state, node_id, vector_id).await?;
    vector.mark_deleted();

    state.vectors.delete(vector).await?.ok_or_else(|| {
        HttpError::persistence_failed(format!(
            "Failed to delete vector {} for node {}",
            vector_id, node_id
        ))
    })?;

    tracing::info!("Deleted vector {} for node {}", vector_id, node_id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/node/:id/vectors", get(list_vectors).post(create_vector_set))
        .route("/node/:id/vectors/:ids", get(get_vector_set))
        .route("/node/:id/vector", post(create_vector))
        .route(
            "/node/:id/vector/:vector_id",
            get(get_vector)
                .post(block_vector_creation)
                .put(put_vector)
                .patch(patch_vector)
                .delete(delete_vector),
        )
        .with_state(state)
}
