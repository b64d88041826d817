//! HTTP handlers for the registry endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::store::RegistryStore;

const AGENT_INDEX: &str = "index";
const COMPACT_INDEX: &str = "index-compact";
const COMPONENT_INDEX: &str = "component-index";

/// Body of a 404 response
#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: &'static str,
    pub message: String,
}

impl NotFoundBody {
    pub fn component(name: &str) -> Self {
        Self {
            error: "Not Found",
            message: format!("Component '{name}' not found."),
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /r/{file}`: discovery indexes and registry items, `.json` optional
pub async fn registry_file(
    State(store): State<Arc<RegistryStore>>,
    Path(file): Path<String>,
) -> Response {
    let name = file.strip_suffix(".json").unwrap_or(&file);
    let snapshot = store.current().await;

    let body = match name {
        AGENT_INDEX => Some(snapshot.agent_index()),
        COMPACT_INDEX => Some(snapshot.compact_index()),
        COMPONENT_INDEX if file.ends_with(".json") => Some(snapshot.component_index()),
        _ => snapshot.item(name),
    };

    match body {
        Some(json) => json_response(json.to_string()),
        None => {
            debug!("No registry file for '{}'", file);
            (StatusCode::NOT_FOUND, Json(NotFoundBody::component(name))).into_response()
        }
    }
}

fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
