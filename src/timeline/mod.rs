mod normalize;

pub use normalize::{normalize_activity, normalize_comment, NormalizeOptions};

use jiff::Timestamp;
use serde::Serialize;

use crate::raw::ActivityKind;

// ===================================================================
// Canonical timeline item
// ===================================================================

/// Where a timeline item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Comment,
    Activity,
}

/// One entry of the merged timeline. Same shape whatever the source
/// record looked like.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub kind: ItemKind,
    /// ISO-8601, or `"unknown date"` when the source had none.
    pub timestamp: String,
    /// Parsed form of `timestamp`, used for ordering.
    #[serde(skip)]
    pub instant: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub payload: ItemPayload,
    /// The source record verbatim, when raw data was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Comment text for comments and comment postings, change details for
/// every other activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemPayload {
    Comment(CommentPayload),
    Activity(ActivityPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub text: String,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    pub activity_type: String,
    #[serde(skip)]
    pub activity_kind: ActivityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_values: Option<Vec<String>>,
}

impl TimelineItem {
    /// Ordering key. Items without a timestamp sort as the Unix epoch,
    /// i.e. before everything dated.
    pub fn sort_key(&self) -> Timestamp {
        self.instant.unwrap_or(Timestamp::UNIX_EPOCH)
    }

    /// The activity payload, if this item carries one.
    pub fn activity(&self) -> Option<&ActivityPayload> {
        match &self.payload {
            ItemPayload::Activity(payload) => Some(payload),
            ItemPayload::Comment(_) => None,
        }
    }
}

// ===================================================================
// Merging
// ===================================================================

/// Sort ascending by timestamp. The sort is stable, so equal timestamps
/// keep their input order.
pub fn sort_timeline(items: &mut [TimelineItem]) {
    items.sort_by_key(TimelineItem::sort_key);
}

/// Keep only the `max` most recent activity items (`0` keeps all). The
/// cut is taken from the sorted sequence, not from input order.
pub fn limit_activities(mut items: Vec<TimelineItem>, max: usize) -> Vec<TimelineItem> {
    sort_timeline(&mut items);
    if max > 0 && items.len() > max {
        items.drain(..items.len() - max);
    }
    items
}

/// Concatenate activity and comment items and sort them into one
/// chronological timeline. On equal timestamps activities precede
/// comments.
pub fn merge_timeline(
    activities: Vec<TimelineItem>,
    comments: Vec<TimelineItem>,
) -> Vec<TimelineItem> {
    let mut timeline = activities;
    timeline.extend(comments);
    sort_timeline(&mut timeline);
    timeline
}
