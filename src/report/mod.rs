use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attribution::{attribute, ActivelyWorkedContributor, AttributionRules};
use crate::contributors::{summarize_contributors, Contributor};
use crate::directory::UserDirectory;
use crate::format::{format_size, format_timestamp};
use crate::raw::{Parsed, RawAttachment, RawCustomField, RawIssue};
use crate::timeline::{
    limit_activities, merge_timeline, normalize_activity, normalize_comment, NormalizeOptions,
    TimelineItem,
};

// ===================================================================
// Input: engine options
// ===================================================================

/// Everything that shapes one report. Built from preferences, then
/// adjusted by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Comment text beyond this many chars is truncated (`0` = no limit).
    pub max_comment_length: usize,
    /// Keep only this many of the most recent activities (`0` = no limit).
    pub max_activities: usize,
    /// Attach each source record verbatim to its timeline item.
    pub include_raw_data: bool,
    pub rules: AttributionRules,
}

// ===================================================================
// Output: the report handed to the renderer
// ===================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub fields: Vec<FieldSummary>,
    pub attachments: Vec<AttachmentSummary>,
    pub timeline: Vec<TimelineItem>,
    /// `None` when nobody identifiable authored anything.
    pub contributors: Option<Vec<Contributor>>,
    pub actively_worked_contributors: Vec<ActivelyWorkedContributor>,
    /// Records dropped while reading the issue.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    /// Set when the input was not an issue object at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A custom field and its current value(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub name: String,
    /// Human-readable, e.g. `1.5 KB`; absent when the tracker sent none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub created: String,
}

impl IssueReport {
    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

// ===================================================================
// Entry point
// ===================================================================

/// Build the full report for one issue. Never fails: malformed records
/// degrade to defaults or diagnostics, and input that is not an issue
/// object yields an empty report carrying `error`.
pub fn build_report(issue: &Value, options: &ReportOptions) -> IssueReport {
    let (issue, diagnostics) = match RawIssue::parse(issue) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(%error, "input is not an issue");
            return IssueReport::failed(error);
        }
    };
    for diagnostic in &diagnostics {
        debug!(%diagnostic, "dropped record");
    }

    let normalize = NormalizeOptions {
        max_comment_length: options.max_comment_length,
        include_raw_data: options.include_raw_data,
    };
    let mut directory = UserDirectory::new();

    let fields = summarize_fields(&issue.custom_fields, &mut directory);

    let activities: Vec<TimelineItem> = issue
        .activities
        .iter()
        .filter_map(|p| normalize_activity(p.index, &p.record, &p.raw, normalize, &mut directory))
        .collect();
    let activities = limit_activities(activities, options.max_activities);

    let comments: Vec<TimelineItem> = issue
        .comments
        .iter()
        .map(|p| normalize_comment(p.index, &p.record, &p.raw, normalize, &mut directory))
        .collect();

    let attachments = summarize_attachments(&issue.attachments, &mut directory);

    let timeline = merge_timeline(activities, comments);
    let contributors = summarize_contributors(&timeline, &directory);
    let actively_worked_contributors = attribute(&timeline, &options.rules, &directory);
    debug!(
        items = timeline.len(),
        users = directory.len(),
        credited = actively_worked_contributors.len(),
        "built issue report"
    );

    IssueReport {
        issue_id: issue.id_readable.or(issue.id),
        summary: issue.summary,
        fields,
        attachments,
        timeline,
        contributors,
        actively_worked_contributors,
        diagnostics,
        error: None,
    }
}

/// Summarize named custom fields. User-valued fields also seed the
/// directory, so the current assignee is known even if they never acted.
fn summarize_fields(
    fields: &[Parsed<RawCustomField>],
    directory: &mut UserDirectory,
) -> Vec<FieldSummary> {
    fields
        .iter()
        .filter_map(|p| {
            let name = p.record.name.clone()?;
            let values = match &p.record.value {
                Some(value) => {
                    for user in value.users() {
                        directory.register(&user);
                    }
                    value.display_values()
                }
                None => Vec::new(),
            };
            Some(FieldSummary { name, values })
        })
        .collect()
}

fn summarize_attachments(
    attachments: &[Parsed<RawAttachment>],
    directory: &mut UserDirectory,
) -> Vec<AttachmentSummary> {
    attachments
        .iter()
        .map(|p| {
            let attachment = &p.record;
            if let Some(author) = &attachment.author {
                directory.register(author);
            }
            AttachmentSummary {
                name: attachment
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("attachment-{}", p.index)),
                size: attachment.size.map(format_size),
                author_id: attachment.author.as_ref().and_then(|a| a.id.clone()),
                created: format_timestamp(attachment.created.as_ref()).0,
            }
        })
        .collect()
}
