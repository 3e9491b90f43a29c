use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use super::deserializers::deserialize_page;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// 1-based page number taken from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(pub i64);

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

impl Page {
    /// The window of `items` this page covers, clipped to the slice bounds.
    /// Pages before the first or past the last are empty.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self
            .0
            .checked_sub(1)
            .and_then(|n| usize::try_from(n).ok())
            .and_then(|n| n.checked_mul(QUESTIONS_PER_PAGE));
        match start {
            Some(start) if start < items.len() => {
                let end = (start + QUESTIONS_PER_PAGE).min(items.len());
                &items[start..end]
            }
            _ => &[],
        }
    }
}

pub fn paginate<T: Clone>(page: Page, items: &[T]) -> Vec<T> {
    page.slice(items).to_vec()
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_page")]
    page: Option<i64>,
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let page = Query::<PageQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.page)
            .map(Page)
            .unwrap_or_default();
        Ok(page)
    }
}
