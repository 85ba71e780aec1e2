use crate::error::Result;
use crate::handlers::{authorize, check_rate_limit};
use crate::model::LinksResponse;
use crate::state::AppState;
use axum::extract::{ConnectInfo, Query, State};
use axum::Json;
use linkstash_cache::SnapshotCache;
use linkstash_core::{ListQuery, SortOrder, StableKey};
use linkstash_guard::IntrusionAttempt;
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::{debug, warn};

/// Query parameters of the listing endpoint. `url` + `title` adds, `delete`
/// removes, `backup` triggers a manual export; the rest shape the listing.
#[derive(Debug, Default, Deserialize)]
pub struct LinksParams {
    pub secret: Option<String>,
    pub sort: Option<SortOrder>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub delete: Option<String>,
    pub backup: Option<bool>,
}

pub async fn links_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<LinksParams>,
) -> Result<Json<LinksResponse>> {
    let client_ip = addr.ip().to_string();
    authorize(
        &state,
        params.secret.as_deref(),
        IntrusionAttempt {
            session_id: StableKey::of_text(&client_ip).to_string(),
            ip_address: client_ip.clone(),
            used_secret: params.secret.clone().unwrap_or_default(),
            submitted_title: params.title.clone().unwrap_or_default(),
            submitted_url: params.url.clone().unwrap_or_default(),
        },
    )
    .await?;
    check_rate_limit(&state.limiter, &client_ip, 60).await?;

    let mut message = None;

    if params.backup == Some(true) {
        state.store.backup(state.notifier.as_ref()).await?;
        message = Some("backup notification sent".to_string());
    }

    if let Some(url) = &params.delete {
        let removed = state.store.delete(url).await?;
        message = Some(if removed > 0 {
            "the url has been deleted".to_string()
        } else {
            "nothing matched the url to delete".to_string()
        });
    }

    if let (Some(url), Some(title)) = (&params.url, &params.title) {
        state.store.add(url, title, &state.blacklist).await?;
        message = Some("the url has been added".to_string());
    }

    // Inline maintenance: retention sweep plus state-file hygiene. Neither
    // failure mode should cost the client their listing.
    if let Err(e) = state.store.sweep(state.notifier.as_ref()).await {
        warn!(error = %e, "retention sweep failed");
    }
    run_hygiene(&state).await;

    let query = ListQuery {
        sort: params.sort.unwrap_or_default(),
        search: params.search.clone(),
        page: params.page.unwrap_or(1),
        page_size: state.page_size,
    };
    let page = state.store.query(&query).await?;
    Ok(Json(LinksResponse::from_page(page, message)))
}

async fn run_hygiene(state: &AppState) {
    match state.cache.evict_idle().await {
        Ok(evicted) if evicted > 0 => debug!(evicted, "evicted idle cache snapshots"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "cache hygiene failed"),
    }
    for limiter in [&state.limiter, &state.proxy_limiter] {
        match limiter.evict_idle().await {
            Ok(evicted) if evicted > 0 => debug!(evicted, "evicted idle rate-limit counters"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "rate-limit hygiene failed"),
        }
    }
}
