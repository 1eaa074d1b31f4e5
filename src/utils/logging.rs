// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;
use url::Url;

/// Reduce an endpoint to its origin (scheme://host[:port]) for user-facing
/// error text. Error messages must never echo the full probed path back at
/// the operator; the origin is what they typed and what they can fix.
pub fn endpoint_origin(endpoint: &str) -> String {
    let s = endpoint.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Ok(url) = Url::parse(s) {
        if let Some(host) = url.host_str() {
            return match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            };
        }
    }

    // Not parseable as an absolute URL; keep at most scheme + authority parts.
    s.splitn(4, '/').take(3).collect::<Vec<_>>().join("/")
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let (phase, rest) = extract_tag(message, "[PHASE:");
    let (step, cleaned) = extract_tag(&rest, "[STEP:");
    (phase, step, cleaned)
}

fn extract_tag(message: &str, tag: &str) -> (Option<String>, String) {
    let Some(start) = message.find(tag) else {
        return (None, message.to_string());
    };
    let Some(end) = message[start..].find(']') else {
        return (None, message.to_string());
    };

    let value = message[start + tag.len()..start + end].trim().to_string();
    let cleaned = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    (Some(value), cleaned)
}

/// Format log entry as JSON for structured parsing
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_origin_strips_probe_path() {
        assert_eq!(
            endpoint_origin("http://gdn.example.com/cfg/apps"),
            "http://gdn.example.com"
        );
        assert_eq!(
            endpoint_origin("https://stream.example.com:4443/streaming/stream"),
            "https://stream.example.com:4443"
        );
    }

    #[test]
    fn endpoint_origin_keeps_bare_origin() {
        assert_eq!(
            endpoint_origin("http://localhost:8111"),
            "http://localhost:8111"
        );
        assert_eq!(endpoint_origin("http://example.com/"), "http://example.com");
    }

    #[test]
    fn endpoint_origin_unparseable_input_falls_back_to_prefix() {
        // No scheme; keep the leading chunks rather than failing.
        assert_eq!(
            endpoint_origin("example.com/cfg/apps/extra"),
            "example.com/cfg/apps"
        );
        assert_eq!(endpoint_origin(""), "");
    }

    #[test]
    fn parse_log_metadata_extracts_phase_and_step() {
        let (phase, step, cleaned) =
            parse_log_metadata("[PHASE: wizard] [STEP: advance] Catalog fetched");
        assert_eq!(phase.as_deref(), Some("wizard"));
        assert_eq!(step.as_deref(), Some("advance"));
        assert_eq!(cleaned, "Catalog fetched");
    }

    #[test]
    fn parse_log_metadata_without_tags_passes_through() {
        let (phase, step, cleaned) = parse_log_metadata("plain message");
        assert!(phase.is_none());
        assert!(step.is_none());
        assert_eq!(cleaned, "plain message");
    }

    #[test]
    fn parse_log_metadata_phase_only() {
        let (phase, step, cleaned) = parse_log_metadata("[PHASE: tui] starting");
        assert_eq!(phase.as_deref(), Some("tui"));
        assert!(step.is_none());
        assert_eq!(cleaned, "starting");
    }

    #[test]
    fn format_json_log_includes_metadata_fields() {
        let line = format_json_log(
            "2026-01-01T00:00:00Z",
            Level::Info,
            "viewer_setup",
            "Catalog fetched",
            Some("wizard"),
            Some("advance"),
        );

        let parsed: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["phase"], "wizard");
        assert_eq!(parsed["step"], "advance");
        assert_eq!(parsed["message"], "Catalog fetched");
    }

    #[test]
    fn format_human_readable_log_orders_segments() {
        let line = format_human_readable_log(
            "2026-01-01 00:00:00",
            Level::Warn,
            "viewer_setup",
            "probe failed",
            Some("wizard"),
            None,
        );
        assert_eq!(
            line,
            "[2026-01-01 00:00:00] [WARN] [PHASE: wizard] [viewer_setup] probe failed"
        );
    }
}
