pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Slice out a 1-based page. Out-of-range pages are empty, never an error.
///
/// Pages below 1 are always empty; a negative page never counts back from
/// the end of `items`.
pub fn paginate<T>(items: &[T], page: i64, per_page: usize) -> &[T] {
    if page < 1 || per_page == 0 {
        return &[];
    }
    let start = (page as usize - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Read `page` from a raw query string; anything unparsable means page 1.
pub fn parse_page(query: Option<&str>) -> i64 {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse::<i64>().ok())
        .unwrap_or(1)
}
