use crate::models::approval::Decision;

/// Confirmation page shown to the reviewer after a decision is recorded.
pub fn decision_page(decision: Decision, token: &str) -> String {
    let (class, follow_up) = match decision {
        Decision::Approved => (
            "success",
            "The document will be delivered to paperless shortly.",
        ),
        Decision::Rejected => ("rejected", "The document has been moved to the rejected folder."),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Duplexer - {title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; margin-top: 50px; }}
        .success {{ color: #28a745; }}
        .rejected {{ color: #dc3545; }}
    </style>
</head>
<body>
    <h1 class="{class}">Document {title}!</h1>
    <p>Token: {token}</p>
    <p>Your document merge has been {decision}.</p>
    <p>{follow_up}</p>
</body>
</html>
"#,
        title = decision.title(),
        class = class,
        token = html_escape(token),
        decision = decision,
        follow_up = follow_up,
    )
}

/// Escape HTML special characters
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
