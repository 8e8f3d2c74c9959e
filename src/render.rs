//! Turns an [`IssueReport`] into output: pretty JSON, or text through a
//! Jinja2 template.

use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;
use minijinja::{context, Environment};

use crate::format::display_date;
use crate::report::IssueReport;

/// Markdown report used when no template is configured. Sees the report
/// with its JSON (camelCase) field names, plus `names`: author id to
/// display name.
pub const DEFAULT_TEMPLATE: &str = r#"# {{ report.issueId or "Issue" }}{{ (": " ~ report.summary) if report.summary }}

{% if report.error %}
Error: {{ report.error }}
{% else %}
{% if report.fields %}
## Fields

{% for field in report.fields %}
- {{ field.name }}: {{ field["values"] | join(", ") if field["values"] else "(none)" }}
{% endfor %}

{% endif %}
{% if report.attachments %}
## Attachments

{% for attachment in report.attachments %}
- {{ attachment.name }}{{ (" (" ~ attachment.size ~ ")") if attachment.size }}, {{ attachment.created | date }}
{% endfor %}

{% endif %}
## Timeline

{% for item in report.timeline %}
{% set who = names[item.authorId] | default(item.authorId or "unknown") %}
{% if item.payload.text is defined %}
- {{ item.timestamp | date }}, {{ who }} commented: {{ item.payload.text }}
{% else %}
- {{ item.timestamp | date }}, {{ who }}: {{ item.payload.activityType }}
  {{- (" " ~ item.payload.field) if item.payload.field }}
  {{- (" +[" ~ item.payload.addedValues | join(", ") ~ "]") if item.payload.addedValues }}
  {{- (" -[" ~ item.payload.removedValues | join(", ") ~ "]") if item.payload.removedValues }}
{% endif %}
{% else %}
No activity.
{% endfor %}

## Contributors

{% for contributor in report.contributors or [] %}
- {{ contributor.name }}: {{ contributor.actions | join(", ") }} (last active {{ contributor.lastActiveTimestamp | date }})
{% else %}
None.
{% endfor %}

## Actively worked

{% for credit in report.activelyWorkedContributors %}
- {{ credit.name }}: {{ credit.state }}
{% else %}
None.
{% endfor %}
{% endif %}
"#;

#[derive(Debug)]
pub enum RenderError {
    Template(String),
    Json(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Template(msg) => write!(f, "template render error: {msg}"),
            RenderError::Json(msg) => write!(f, "json encode error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

pub fn render_json(report: &IssueReport) -> Result<String, RenderError> {
    serde_json::to_string_pretty(report).map_err(|e| RenderError::Json(e.to_string()))
}

/// Render `report` through a Jinja2 template.
pub fn render_text(report: &IssueReport, template: &str) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("date", date);

    let names: BTreeMap<&str, &str> = report
        .contributors
        .iter()
        .flatten()
        .map(|c| (c.user_id.as_str(), c.name.as_str()))
        .collect();

    let tmpl = env
        .template_from_str(template)
        .map_err(|e| RenderError::Template(format!("{e:#}")))?;
    tmpl.render(context! { report, names })
        .map_err(|e| RenderError::Template(format!("{e:#}")))
}

/// Template filter: ISO timestamps become a short UTC date, anything else
/// (e.g. `unknown date`) passes through.
fn date(value: String) -> String {
    match value.parse::<Timestamp>() {
        Ok(ts) => display_date(&ts),
        Err(_) => value,
    }
}
