//! Backend route construction.
//!
//! The backend URL comes from config or the environment and may carry a
//! path prefix or trailing slashes. Routes are joined onto it here so the
//! gateway never builds `//` or leaves a session id unescaped.

use reqwest::Url;

/// Strip trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use ragline::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://rag.local/api///"), "http://rag.local/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a route onto the backend base URL.
///
/// # Examples
///
/// ```
/// use ragline::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/upload"),
///     "http://localhost:8000/upload"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Join a route plus one opaque path segment, such as a session id.
///
/// The segment is percent-encoded, so ids containing `/` or spaces stay a
/// single segment. Falls back to plain joining when the base is not a URL
/// reqwest can parse; the request then fails with a transport error.
///
/// # Examples
///
/// ```
/// use ragline::utils::url::construct_resource_url;
///
/// assert_eq!(
///     construct_resource_url("http://localhost:8000", "messages", "abc-123"),
///     "http://localhost:8000/messages/abc-123"
/// );
/// ```
pub fn construct_resource_url(base_url: &str, endpoint: &str, segment: &str) -> String {
    let route = construct_api_url(base_url, endpoint);
    match Url::parse(&route) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(segment);
            }
            url.to_string()
        }
        Err(_) => format!("{route}/{segment}"),
    }
}
