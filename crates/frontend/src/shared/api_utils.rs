//! API URL helpers.

/// Backend port used when the page is served from another origin (`trunk serve`).
const BACKEND_PORT: &str = "3000";

/// Base URL for API requests.
///
/// Same origin when the page is served by the backend itself, otherwise the
/// current host on the backend port. Empty string without a window.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = location.port().unwrap_or_default();
    base_for(&protocol, &hostname, &port)
}

fn base_for(protocol: &str, hostname: &str, port: &str) -> String {
    if port == BACKEND_PORT {
        String::new()
    } else {
        format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
    }
}

/// Full API URL for a path starting with `/api/`.
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
