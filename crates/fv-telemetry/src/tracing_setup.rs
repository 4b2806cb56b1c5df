use uuid::Uuid;

/// A fresh 32-hex-character id used to correlate every log line of one CLI run.
pub fn generate_trace_id() -> String {
    Uuid::new_v4().as_simple().to_string()
}

/// Root span for a single `finvision` command invocation.
///
/// Returns the span together with its trace id so the caller can print or
/// log it before the span is entered.
pub fn command_span(command: &str, api_url: &str) -> (tracing::Span, String) {
    let trace_id = generate_trace_id();
    let span = tracing::info_span!(
        "command",
        trace_id = %trace_id,
        command = %command,
        api_url = %api_url,
        outcome = tracing::field::Empty,
    );
    (span, trace_id)
}

/// Record how a command ended on its root span.
pub fn record_outcome(span: &tracing::Span, ok: bool) {
    span.record("outcome", if ok { "ok" } else { "error" });
}
