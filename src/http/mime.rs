//! Content types for served files.

/// Returned for any extension without a known mapping.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Maps an extension (leading dot included, e.g. ".css") to a content type.
pub fn mime_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        ".html" => "text/html",
        ".css" => "text/css",
        ".js" => "application/javascript",
        _ => DEFAULT_MIME,
    }
}
