use serde_json::Value;
use tracing::debug;

use crate::directory::UserDirectory;
use crate::format::{format_size, format_timestamp, truncate};
use crate::raw::{ActivityKind, ChangeValue, ChangeValues, RawActivity, RawComment};

use super::{ActivityPayload, CommentPayload, ItemKind, ItemPayload, TimelineItem};

/// Per-call knobs for normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub max_comment_length: usize,
    pub include_raw_data: bool,
}

/// Turn one activity record into a timeline item, registering every user
/// it mentions in `directory`. Returns `None` only for a record with
/// nothing in it.
pub fn normalize_activity(
    index: usize,
    activity: &RawActivity,
    raw: &Value,
    options: NormalizeOptions,
    directory: &mut UserDirectory,
) -> Option<TimelineItem> {
    if activity.is_empty() {
        debug!(index, "dropping empty activity record");
        return None;
    }

    if let Some(author) = &activity.author {
        directory.register(author);
    }
    for values in [&activity.added, &activity.removed].into_iter().flatten() {
        for user in values.users() {
            directory.register(&user);
        }
    }

    let kind = activity.kind();
    let (timestamp, instant) = format_timestamp(activity.timestamp.as_ref());

    let payload = match (kind, activity.posted_text()) {
        (ActivityKind::CommentAdded, Some(text)) => ItemPayload::Comment(CommentPayload {
            text: truncate(text, options.max_comment_length),
            is_pinned: false,
        }),
        _ => ItemPayload::Activity(activity_payload(kind, activity)),
    };

    Some(TimelineItem {
        id: activity
            .id
            .clone()
            .unwrap_or_else(|| format!("activity-{index}")),
        kind: ItemKind::Activity,
        timestamp,
        instant,
        author_id: activity.author.as_ref().and_then(|a| a.id.clone()),
        payload,
        raw: options.include_raw_data.then(|| raw.clone()),
    })
}

fn activity_payload(kind: ActivityKind, activity: &RawActivity) -> ActivityPayload {
    let values = |v: &Option<ChangeValues>| v.as_ref().map(|v| display_values(kind, v));
    ActivityPayload {
        activity_type: match kind {
            ActivityKind::Other => activity
                .type_name
                .clone()
                .unwrap_or_else(|| kind.label().to_string()),
            _ => kind.label().to_string(),
        },
        activity_kind: kind,
        field: activity.field_name().map(String::from),
        added_values: values(&activity.added),
        removed_values: values(&activity.removed),
    }
}

/// Attachment values also show their size; everything else uses the plain
/// value display.
fn display_values(kind: ActivityKind, values: &ChangeValues) -> Vec<String> {
    match kind {
        ActivityKind::Attachment => values
            .iter()
            .map(|value| match value.as_object() {
                Some(obj) => match obj.size {
                    Some(size) => format!("{} ({})", obj.display(), format_size(size)),
                    None => obj.display().to_string(),
                },
                None => value.display(),
            })
            .collect(),
        ActivityKind::FieldChange
        | ActivityKind::CommentAdded
        | ActivityKind::IssueCreated
        | ActivityKind::WorkItem
        | ActivityKind::VisibilityChange
        | ActivityKind::Links
        | ActivityKind::Summary
        | ActivityKind::Description
        | ActivityKind::Other => values.iter().map(ChangeValue::display).collect(),
    }
}

/// Turn one comment into a timeline item. Never fails: missing text is
/// empty, a missing date is `"unknown date"`.
pub fn normalize_comment(
    index: usize,
    comment: &RawComment,
    raw: &Value,
    options: NormalizeOptions,
    directory: &mut UserDirectory,
) -> TimelineItem {
    if let Some(author) = &comment.author {
        directory.register(author);
    }
    let (timestamp, instant) = format_timestamp(comment.created.as_ref());
    let text = comment.text.as_deref().unwrap_or_default();

    TimelineItem {
        id: comment
            .id
            .clone()
            .unwrap_or_else(|| format!("comment-{index}")),
        kind: ItemKind::Comment,
        timestamp,
        instant,
        author_id: comment.author.as_ref().and_then(|a| a.id.clone()),
        payload: ItemPayload::Comment(CommentPayload {
            text: truncate(text, options.max_comment_length),
            is_pinned: comment.is_pinned.unwrap_or(false),
        }),
        raw: options.include_raw_data.then(|| raw.clone()),
    }
}
