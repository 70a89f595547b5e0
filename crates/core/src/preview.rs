/// Cache-busting URL of the site's entry page.
///
/// `base` may point at the site root or directly at a page; a trailing
/// `index.html` is added only in the first case.
pub fn preview_url(base: &str, timestamp_millis: i64) -> String {
    let base = base.trim();
    let (path, query) = match base.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (base, None),
    };

    let page = if path.ends_with(".html") {
        path.to_string()
    } else {
        format!("{}/index.html", path.trim_end_matches('/'))
    };

    match query {
        Some(query) => format!("{}?{}&t={}", page, query, timestamp_millis),
        None => format!("{}?t={}", page, timestamp_millis),
    }
}
