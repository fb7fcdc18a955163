//! Generic traversal of `Link: rel="next"` paginated listings.

use crate::link_header::parse_link_header;
use std::collections::HashSet;
use std::future::Future;

/// One page of a listing: its items and the raw `Link` header, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub link: Option<String>,
}

/// Walks a paginated listing starting at `start_url` until no `next` link
/// remains, returning every item in server order.
///
/// `on_page` is called after each page with the number of items on that page
/// alone. Any failed request aborts the walk and its error is returned; the
/// pages collected so far are dropped. A `next` link to a URL that was already
/// requested ends the walk.
pub async fn fetch_all_pages<T, E, F, Fut>(
    start_url: String,
    request: F,
    on_page: impl FnMut(usize),
) -> Result<Vec<T>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    fetch_all_pages_with(start_url, Ok, request, on_page).await
}

/// Like [`fetch_all_pages`], but every `next` link is passed through
/// `next_url` before it is requested. The rewritten URL is the one requested
/// and the one checked against earlier requests.
pub async fn fetch_all_pages_with<T, E, N, F, Fut>(
    start_url: String,
    mut next_url: N,
    mut request: F,
    mut on_page: impl FnMut(usize),
) -> Result<Vec<T>, E>
where
    N: FnMut(String) -> Result<String, E>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut requested = HashSet::new();
    let mut cursor = Some(start_url);

    while let Some(url) = cursor.take() {
        requested.insert(url.clone());
        let page = request(url).await?;
        on_page(page.items.len());

        cursor = match parse_link_header(page.link.as_deref()).remove("next") {
            Some(next) => Some(next_url(next.url)?).filter(|next| !requested.contains(next)),
            None => None,
        };
        items.extend(page.items);
    }

    Ok(items)
}
