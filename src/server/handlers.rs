//! Route handlers. Each one unpacks its request, delegates to a service and
//! shapes the JSON reply; failures travel as [`Error`] and render themselves.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::AppState;
use crate::enrichment::EnrichmentResult;
use crate::error::{Error, Result};
use crate::library::{FilePage, MetadataUpdate, Page, is_plain_file_name, resolve_within};
use crate::model::{DownloadRequest, TransferRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub files: Vec<String>,
    pub message: String,
    pub download_dir: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub metadata: EnrichmentResult,
}

/// `?page=&limit=&q=`, all optional and parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Page {
        Page::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Malformed JSON is the client's fault, reported like any other bad input.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::validation(rejection.body_text()))
}

pub async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>> {
    let request = body(payload)?;
    let outcome = state.pipeline.run(&request).await?;

    Ok(Json(DownloadResponse {
        success: true,
        message: format!("Downloaded {} files", outcome.files.len()),
        files: outcome.files,
        download_dir: outcome.download_dir.display().to_string(),
    }))
}

pub async fn transfer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>> {
    let request = body(payload)?;
    let outcome = state.transfer.run(&request).await?;

    Ok(Json(TransferResponse {
        success: true,
        message: outcome.message,
        files: outcome.files,
    }))
}

pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<FilePage>> {
    Ok(Json(state.library.list(query.page()).await?))
}

pub async fn search_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<FilePage>> {
    let needle = query.q.as_deref().unwrap_or_default();
    Ok(Json(state.library.search(needle, query.page()).await?))
}

pub async fn update_metadata(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: std::result::Result<Json<MetadataUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let update = body(payload)?;
    state.library.update_metadata(&filename, &update).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Metadata updated successfully".to_string(),
    }))
}

pub async fn import_lastfm(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ImportResponse>> {
    let metadata = state.library.import_lastfm(&filename).await?;

    Ok(Json(ImportResponse {
        success: true,
        message: "Metadata imported from Last.fm successfully".to_string(),
        metadata,
    }))
}

/// Serve one stored file. Only plain names directly inside the library are
/// served; anything else is refused before the filesystem is touched.
pub async fn serve_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response> {
    let Some(path) = resolve_within(state.library.root(), &filename)
        .filter(|_| is_plain_file_name(&filename))
    else {
        tracing::warn!(file = %filename, "Refused download outside the library");
        return Err(Error::AccessDenied);
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(Error::not_found(path)),
    }

    // Streams the body and handles Range and conditional requests
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let page = ListQuery::default().page();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }
}
