//! Wire-level debugging via LOUD_WIRE environment variable.
//!
//! When `LOUD_WIRE` is set to any value, prints raw JSON of REST requests and
//! responses, and of every Live frame, to stderr with pretty formatting and
//! colors.
//!
//! # Usage
//!
//! ```bash
//! LOUD_WIRE=1 cargo run --example live_text
//! ```
//!
//! # Output Format
//!
//! - Green `>>>` for outgoing requests and frames
//! - Red `<<<` for incoming responses and frames
//! - Blue for SSE streaming chunks
//! - `[REQ#n]` correlates a REST request with its response; `[WS#n]`
//!   identifies one Live session
//!
//! Base64-encoded media content is truncated to keep output readable.

use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Session ID counter for Live connections
static SESSION_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Cached check for whether LOUD_WIRE is enabled
static ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if LOUD_WIRE debugging is enabled.
///
/// The result is cached after first check. `LOUD_WIRE` must be set before the
/// first API call is made.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Get the next Live session ID.
#[must_use]
pub fn next_session_id() -> usize {
    SESSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Fields that should have their values truncated if too long.
/// These typically contain base64-encoded binary data.
const TRUNCATE_FIELDS: &[&str] = &["data", "sdkBlob"];

/// Maximum length before truncation (keep first 100 chars).
const TRUNCATE_THRESHOLD: usize = 100;

/// Walks the JSON tree and truncates long `"data"`-like string fields.
/// Text content and other fields are preserved in full.
fn truncate_long_fields(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if TRUNCATE_FIELDS.contains(&key.as_str()) {
                    // base64 is ASCII, so byte slicing is safe here
                    if let serde_json::Value::String(s) = val
                        && s.len() > TRUNCATE_THRESHOLD
                        && s.is_char_boundary(TRUNCATE_THRESHOLD)
                    {
                        *s = format!("{}...", &s[..TRUNCATE_THRESHOLD]);
                    }
                } else {
                    truncate_long_fields(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                truncate_long_fields(item);
            }
        }
        _ => {}
    }
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn prefix(tag: String) -> String {
    format!("{} {} {}", "[LOUD_WIRE]".bold(), timestamp().dimmed(), tag.cyan())
}

fn request_prefix(request_id: usize) -> String {
    prefix(format!("[REQ#{request_id}]"))
}

fn session_prefix(session_id: usize) -> String {
    prefix(format!("[WS#{session_id}]"))
}

/// Prints a JSON document line by line, or the raw text (truncated) if it is
/// not JSON.
fn print_body(prefix: &str, label: colored::ColoredString, body: &str, raw_limit: usize) {
    if let Ok(mut parsed) = serde_json::from_str::<serde_json::Value>(body) {
        truncate_long_fields(&mut parsed);
        eprintln!("{prefix} {label}:");
        let rendered = colored_json::to_colored_json_auto(&parsed)
            .ok()
            .or_else(|| serde_json::to_string_pretty(&parsed).ok());
        if let Some(rendered) = rendered {
            for line in rendered.lines() {
                eprintln!("{prefix} {line}");
            }
        }
    } else {
        let truncated = super::error_helpers::truncate_for_context(body, raw_limit);
        eprintln!("{prefix} {label}: {truncated}");
    }
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&str>) {
    if !is_enabled() {
        return;
    }

    let prefix = request_prefix(request_id);
    eprintln!("{prefix} {} {method} {url}", ">>>".green().bold());

    if let Some(body) = body {
        print_body(&prefix, "Body".green(), body, 500);
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = request_prefix(request_id);
    let status_text = if status < 300 {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };

    eprintln!("{prefix} {} {status_text}", "<<<".red().bold());
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() {
        return;
    }

    print_body(&request_prefix(request_id), "Response".red(), body, 1000);
}

/// Log an SSE streaming chunk.
pub fn log_sse_chunk(request_id: usize, raw_json: &str) {
    if !is_enabled() {
        return;
    }

    print_body(&request_prefix(request_id), "SSE".blue().bold(), raw_json, 1000);
}

/// Log the start of a file upload.
pub fn log_upload_start(request_id: usize, file_name: &str, mime_type: &str, size: u64) {
    if !is_enabled() {
        return;
    }

    let size_mb = size as f64 / 1_048_576.0;
    eprintln!(
        "{} {} {} \"{file_name}\" ({mime_type}, {size_mb:.2} MB)",
        request_prefix(request_id),
        ">>>".green().bold(),
        "UPLOAD".green().bold()
    );
}

/// Log file upload completion.
pub fn log_upload_complete(request_id: usize, file_uri: &str) {
    if !is_enabled() {
        return;
    }

    eprintln!(
        "{} {} {} {file_uri}",
        request_prefix(request_id),
        "<<<".red().bold(),
        "UPLOADED".green().bold()
    );
}

/// Log a Live connection attempt. The API key is redacted from the URL.
pub fn log_ws_connect(session_id: usize, url: &str) {
    if !is_enabled() {
        return;
    }

    let redacted = match url.split_once("key=") {
        Some((head, _)) => format!("{head}key=***"),
        None => url.to_string(),
    };
    eprintln!(
        "{} {} {} {redacted}",
        session_prefix(session_id),
        ">>>".green().bold(),
        "CONNECT".green().bold()
    );
}

/// Log an outgoing Live frame.
pub fn log_ws_send(session_id: usize, frame: &str) {
    if !is_enabled() {
        return;
    }

    print_body(&session_prefix(session_id), ">>> Frame".green(), frame, 500);
}

/// Log a complete incoming Live frame.
pub fn log_ws_receive(session_id: usize, frame: &str) {
    if !is_enabled() {
        return;
    }

    print_body(&session_prefix(session_id), "<<< Frame".red(), frame, 1000);
}

/// Log a Live close, from either side.
pub fn log_ws_close(session_id: usize, initiator: &str) {
    if !is_enabled() {
        return;
    }

    eprintln!(
        "{} {} closed by {initiator}",
        session_prefix(session_id),
        "CLOSE".yellow().bold()
    );
}
