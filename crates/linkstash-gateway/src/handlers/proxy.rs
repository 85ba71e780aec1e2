use crate::error::{AppError, Result};
use crate::handlers::{authorize, check_rate_limit};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use linkstash_core::StableKey;
use linkstash_guard::IntrusionAttempt;
use serde::Deserialize;
use std::net::SocketAddr;

/// Files the proxy is allowed to hand out. Names are matched exactly, so
/// path traversal never reaches the filesystem.
const ALLOWED_FILES: &[&str] = &["favorites.json", "intruder.json", "blacklist.txt"];

#[derive(Debug, Default, Deserialize)]
pub struct ProxyParams {
    pub secret: Option<String>,
}

pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(name): Path<String>,
    Query(params): Query<ProxyParams>,
) -> Result<Response> {
    let client_ip = addr.ip().to_string();
    check_rate_limit(&state.proxy_limiter, &client_ip, 120).await?;
    authorize(
        &state,
        params.secret.as_deref(),
        IntrusionAttempt {
            session_id: StableKey::of_text(&client_ip).to_string(),
            ip_address: client_ip.clone(),
            used_secret: params.secret.clone().unwrap_or_default(),
            submitted_title: String::new(),
            submitted_url: name.clone(),
        },
    )
    .await?;

    if !ALLOWED_FILES.contains(&name.as_str()) {
        return Err(AppError::NotFound);
    }

    let path = state.data_dir.join(&name);
    let bytes = tokio::fs::read(&path).await.map_err(|_| AppError::NotFound)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(disposition) =
        header::HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("private, no-cache, must-revalidate"),
    );
    Ok((StatusCode::OK, headers, bytes).into_response())
}
