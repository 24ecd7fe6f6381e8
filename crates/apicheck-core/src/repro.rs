//! HTTP file generator - converts failed steps to .http format

use crate::report::RunReport;
use crate::transport::RequestSnapshot;

/// Generate .http file content from every failed step in a run.
#[must_use]
pub fn to_http_file(report: &RunReport, base_url_var: &str) -> String {
    let mut lines = Vec::new();

    let failed: Vec<_> = report
        .scenarios
        .iter()
        .flat_map(|s| {
            s.steps
                .iter()
                .filter(|step| step.failed())
                .map(move |step| (s, step))
        })
        .collect();

    lines.push(format!(
        "# Auto-generated reproduction cases ({} failed steps)",
        failed.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for (scenario, step) in failed {
        lines.push(format!(
            "### {} step {} - {}",
            scenario.name, step.index, step.operation
        ));
        for verdict in step.verdicts.iter().filter(|v| !v.passed) {
            lines.push(format!("# {}: {}", verdict.check, verdict.message));
        }

        let Some(request) = &step.request else {
            lines.push("# (request was never issued)".to_string());
            lines.push(String::new());
            continue;
        };

        let url = if request.url.starts_with("http") {
            request.url.clone()
        } else {
            format!("{{{{{base_url_var}}}}}{}", request.url)
        };
        lines.push(format!("{} {}", request.method, url));

        for (key, value) in &request.headers {
            if !matches!(key.to_lowercase().as_str(), "host" | "content-length") {
                lines.push(format!("{key}: {value}"));
            }
        }

        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
#[must_use]
pub fn request_to_http(request: &RequestSnapshot, comment: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(c) = comment {
        lines.push(format!("### {c}"));
    }

    lines.push(format!("{} {}", request.method, request.url));

    for (key, value) in &request.headers {
        lines.push(format!("{key}: {value}"));
    }

    lines.join("\n")
}
