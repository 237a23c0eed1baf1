//! Node endpoints
//!
//! - `GET /nodes/pairs` - paged `(nodeId, nodeName)` pairs
//! - `GET /nodes` - paged nodes
//! - `GET /nodes/:ids` - a set of nodes, e.g. `/nodes/(1,2,3)`
//! - `POST /nodes` - create a set of nodes
//! - `GET /node/:id` - one node
//! - `POST /node` - create a node
//! - `POST /node/:id` - always refused: 409 when the node exists, else 404
//! - `PUT /node/:id` - replace the editable fields
//! - `PATCH /node/:id` - JSON Patch over `{nodeName, nodeType, nodeTopic}`
//! - `DELETE /node/:id` - logical delete
//!
//! Collection responses carry an `X-Pagination` header.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use unionall_core::models::{DataRequestParams, Node, NodeId};

use crate::dto::{validate_all, NodeDto, NodeEdit};
use crate::http_error::{HttpError, NODE_NOT_FOUND, RESOURCE_EXISTS, VALIDATION_ERROR};
use crate::ids::{format_id_list, parse_id_list};
use crate::json_patch::{self, PatchOperation};
use crate::paging::{pagination_header, PageQuery};
use crate::AppState;

fn to_dtos(nodes: &[Node]) -> Vec<NodeDto> {
    nodes.iter().map(NodeDto::from).collect()
}

async fn find_node(state: &AppState, id: NodeId) -> Result<Node, HttpError> {
    state
        .nodes
        .get_by_id(id)
        .await?
        .ok_or_else(|| HttpError::node_not_found(id))
}

async fn list_name_pairs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpError> {
    let params = DataRequestParams::from(query);
    let pairs = state.nodes.list_name_pairs(&params).await?;
    let total = state.nodes.count_active(&params).await?;

    Ok(([pagination_header(total, &params)], Json(pairs)).into_response())
}

async fn list_nodes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpError> {
    let params = DataRequestParams::from(query);
    let nodes = state.nodes.list_all(&params).await?;
    let total = state.nodes.count_active(&params).await?;

    Ok(([pagination_header(total, &params)], Json(to_dtos(&nodes))).into_response())
}

async fn get_node_set(
    State(state): State<AppState>,
    Path(ids): Path<String>,
) -> Result<Json<Vec<NodeDto>>, HttpError> {
    let ids = parse_id_list(&ids)?;
    let nodes = state.nodes.select_set(&ids).await?.ok_or_else(|| {
        HttpError::new(
            format!("Not every node in {} was found", format_id_list(ids.iter().copied())),
            NODE_NOT_FOUND,
        )
    })?;

    Ok(Json(to_dtos(&nodes)))
}

async fn create_node_set(
    State(state): State<AppState>,
    body: Result<Json<Vec<NodeEdit>>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(edits) = body?;

    let valid = validate_all(&edits, NodeEdit::validate).map_err(|failures| {
        HttpError::with_details("Request failed validation", VALIDATION_ERROR, failures.join("; "))
    })?;

    let nodes: Vec<Node> = valid.into_iter().map(|v| v.into_node()).collect();
    let saved = state
        .nodes
        .insert_set(nodes)
        .await?
        .ok_or_else(|| HttpError::persistence_failed("Failed to save node set"))?;

    let location = format!("/nodes/{}", format_id_list(saved.iter().map(|n| n.id())));
    tracing::info!("Created node set {}", location);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(to_dtos(&saved)),
    )
        .into_response())
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<NodeId>,
) -> Result<Json<NodeDto>, HttpError> {
    let node = find_node(&state, id).await?;
    Ok(Json(NodeDto::from(&node)))
}

async fn create_node(
    State(state): State<AppState>,
    body: Result<Json<NodeEdit>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(edit) = body?;
    let valid = edit.validate().map_err(|e| HttpError::unprocessable(&e))?;

    let saved = state
        .nodes
        .insert(valid.into_node())
        .await?
        .ok_or_else(|| HttpError::persistence_failed("Failed to save new node"))?;

    let location = format!("/node/{}", saved.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(NodeDto::from(&saved)),
    )
        .into_response())
}

/// Creating a node at a caller-chosen id is never allowed
async fn block_node_creation(
    State(state): State<AppState>,
    Path(id): Path<NodeId>,
) -> Result<StatusCode, HttpError> {
    find_node(&state, id).await?;
    Err(HttpError::new(
        format!("Node {} already exists", id),
        RESOURCE_EXISTS,
    ))
}

async fn put_node(
    State(state): State<AppState>,
    Path(id): Path<NodeId>,
    body: Result<Json<NodeEdit>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Json(edit) = body?;
    let valid = edit.validate().map_err(|e| HttpError::unprocessable(&e))?;

    let mut node = find_node(&state, id).await?;
    valid.apply_to(&mut node);

    state
        .nodes
        .update(node)
        .await?
        .ok_or_else(|| HttpError::persistence_failed(format!("Failed to update node {}", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn patch_node(
    State(state): State<AppState>,
    Path(id): Path<NodeId>,
    body: Result<Json<Vec<PatchOperation>>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Json(operations) = body?;

    let mut node = find_node(&state, id).await?;

    let mut projection = serde_json::to_value(NodeEdit::from_node(&node)).map_err(|e| {
        HttpError::with_details("Failed to project node", "SERIALIZATION_ERROR", e.to_string())
    })?;
    json_patch::apply(&mut projection, &operations)?;

    let patched: NodeEdit = serde_json::from_value(projection).map_err(|e| {
        HttpError::with_details("Patched node is not valid", VALIDATION_ERROR, e.to_string())
    })?;
    let valid = patched.validate().map_err(|e| HttpError::unprocessable(&e))?;
    valid.apply_to(&mut node);

    state
        .nodes
        .update(node)
        .await?
        .ok_or_else(|| HttpError::persistence_failed(format!("Failed to patch node {}", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<NodeId>,
) -> Result<StatusCode, HttpError> {
    let mut node = find_node(&state, id).await?;
    node.mark_deleted();

    state
        .nodes
        .delete(node)
        .await?
        .ok_or_else(|| HttpError::persistence_failed(format!("Failed to delete node {}", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/nodes/pairs", get(list_name_pairs))
        .route("/nodes", get(list_nodes).post(create_node_set))
        .route("/nodes/:ids", get(get_node_set))
        .route("/node", post(create_node))
        .route(
            "/node/:id",
            get(get_node)
                .post(block_node_creation)
                .put(put_node)
                .patch(patch_node)
                .delete(delete_node),
        )
        .with_state(state)
}
