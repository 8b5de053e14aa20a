//! Template rendering module
//!
//! Substitutes `{{NAME}}` placeholders in the maintenance page with values
//! taken from the request, the invocation context and the clock.
//!
//! Values are inserted verbatim: nothing is HTML-escaped.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::event::{InboundRequest, InvocationContext};

/// Placeholder names recognized in templates
pub const PLACEHOLDERS: [&str; 8] = [
    "REQUEST_ID",
    "TIMESTAMP",
    "PATH",
    "METHOD",
    "SOURCE_IP",
    "USER_AGENT",
    "HOST",
    "FUNCTION_NAME",
];

/// Built-in page served when the stored template is unavailable
pub const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Maintenance</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            text-align: center;
            padding: 50px;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 600px;
            margin: 0 auto;
            background-color: white;
            padding: 40px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 { color: #333; }
        p { color: #666; line-height: 1.6; }
    </style>
</head>
<body>
    <div class="container">
        <h1>&#128295; Maintenance in Progress</h1>
        <p>We're currently performing scheduled maintenance to improve our service.</p>
        <p>Please check back soon. We apologize for any inconvenience.</p>
    </div>
</body>
</html>
"#;

/// Values for each placeholder, in `PLACEHOLDERS` order
fn placeholder_values(
    request: &InboundRequest,
    context: &InvocationContext,
    now: DateTime<Utc>,
) -> [String; 8] {
    [
        context.request_id.clone(),
        format_timestamp(now),
        request.path.clone(),
        request.http_method.clone(),
        request.source_ip().to_string(),
        request.user_agent().to_string(),
        request.host().to_string(),
        context.function_name.clone(),
    ]
}

/// ISO-8601 UTC timestamp with an explicit `+00:00` offset
fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Replace every recognized `{{NAME}}` token in `template`.
/// Unrecognized tokens are left as they are.
pub fn render(
    template: &str,
    request: &InboundRequest,
    context: &InvocationContext,
    now: DateTime<Utc>,
) -> String {
    PLACEHOLDERS
        .iter()
        .zip(placeholder_values(request, context, now))
        .fold(template.to_string(), |html, (name, value)| {
            html.replace(&format!("{{{{{name}}}}}"), &value)
        })
}
