use crate::favorite::Favorite;
use serde::{Deserialize, Serialize};

/// Display order for listings.
///
/// The backing file keeps insertion order (oldest first), so `Desc` reverses
/// it to show the newest saves on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Validated listing parameters.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub sort: SortOrder,
    pub search: Option<String>,
    /// 1-based page number; out-of-range values are clamped.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort: SortOrder::Desc,
            search: None,
            page: 1,
            page_size: 25,
        }
    }
}

/// One page of a listing, with the clamp-corrected page number.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Favorite>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Keeps the favorites whose title, url, or timestamp text contains `query`,
/// case-insensitively. An empty or whitespace query keeps everything.
pub fn filter_by_search(favorites: Vec<Favorite>, query: &str) -> Vec<Favorite> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return favorites;
    }
    favorites
        .into_iter()
        .filter(|favorite| {
            favorite.title.to_lowercase().contains(&needle)
                || favorite.url.to_lowercase().contains(&needle)
                || favorite.timestamp_text().contains(&needle)
        })
        .collect()
}

/// Slices out one page, clamping `page` into `[1, total_pages]`.
///
/// `total_pages` is at least 1 even for an empty listing.
pub fn paginate(items: Vec<Favorite>, page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let offset = (page - 1) * page_size;
    let items = items.into_iter().skip(offset).take(page_size).collect();
    Page {
        items,
        page,
        total_pages,
        total,
    }
}
