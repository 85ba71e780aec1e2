use linkstash_core::{Favorite, Page};
use serde::Serialize;

/// One favorite as rendered in listings.
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub timestamp: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_at: Option<String>,
}

impl From<&Favorite> for LinkView {
    fn from(favorite: &Favorite) -> Self {
        Self {
            timestamp: favorite.timestamp_text(),
            title: favorite.title.clone(),
            url: favorite.url.clone(),
            delete_at: favorite
                .delete_at
                .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// The listing returned by the root endpoint.
#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub links: Vec<LinkView>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinksResponse {
    pub fn from_page(page: Page, message: Option<String>) -> Self {
        Self {
            links: page.items.iter().map(LinkView::from).collect(),
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
