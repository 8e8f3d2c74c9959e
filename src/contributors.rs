//! Who touched the issue, for readable reports. Every authored item counts;
//! no attribution rules apply here.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::Serialize;

use crate::directory::UserDirectory;
use crate::raw::ActivityKind;
use crate::timeline::{ItemKind, ItemPayload, TimelineItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub user_id: String,
    pub name: String,
    /// Free-text action descriptions, deduplicated, in first-seen order.
    pub actions: Vec<String>,
    pub last_active_timestamp: String,
    #[serde(skip)]
    last_active: Option<Timestamp>,
}

impl Contributor {
    fn new(user_id: &str, directory: &UserDirectory) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: directory.display_name(user_id),
            actions: Vec::new(),
            last_active_timestamp: String::new(),
            last_active: None,
        }
    }

    fn record(&mut self, action: String, item: &TimelineItem) {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        // Undated items only set the timestamp when nothing else has.
        if self.last_active_timestamp.is_empty() || item.instant > self.last_active {
            self.last_active_timestamp = item.timestamp.clone();
            self.last_active = item.instant;
        }
    }
}

/// Summarize the authors of a timeline, most recently active first (ties
/// keep encounter order). Returns `None` when no item has an author.
pub fn summarize_contributors(
    timeline: &[TimelineItem],
    directory: &UserDirectory,
) -> Option<Vec<Contributor>> {
    let mut contributors: Vec<Contributor> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();

    for item in timeline {
        let Some(author_id) = item.author_id.as_deref() else {
            continue;
        };
        let idx = *by_id.entry(author_id).or_insert_with(|| {
            contributors.push(Contributor::new(author_id, directory));
            contributors.len() - 1
        });
        contributors[idx].record(describe_action(item), item);
    }

    if contributors.is_empty() {
        return None;
    }
    contributors.sort_by(|a, b| b.last_active.cmp(&a.last_active));
    Some(contributors)
}

/// A short human description of what an item's author did.
pub fn describe_action(item: &TimelineItem) -> String {
    let payload = match (&item.payload, item.kind) {
        (ItemPayload::Comment(_), ItemKind::Comment) => return "commented".to_string(),
        (ItemPayload::Comment(_), ItemKind::Activity) => return "added comment".to_string(),
        (ItemPayload::Activity(payload), _) => payload,
    };
    let adding = payload.added_values.as_ref().is_some_and(|v| !v.is_empty());

    match payload.activity_kind {
        ActivityKind::FieldChange => match &payload.field {
            Some(field) => format!("changed {field}"),
            None => "changed a field".to_string(),
        },
        ActivityKind::CommentAdded => "updated a comment".to_string(),
        ActivityKind::IssueCreated => "created issue".to_string(),
        ActivityKind::WorkItem => "logged work".to_string(),
        ActivityKind::VisibilityChange => "changed visibility".to_string(),
        ActivityKind::Attachment if adding => "attached files".to_string(),
        ActivityKind::Attachment => "removed attachments".to_string(),
        ActivityKind::Links => "updated links".to_string(),
        ActivityKind::Summary => "edited summary".to_string(),
        ActivityKind::Description => "edited description".to_string(),
        ActivityKind::Other => "updated issue".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::UserRef;
    use crate::timeline::{ActivityPayload, CommentPayload};

    fn at(millis: Option<i64>) -> (String, Option<Timestamp>) {
        match millis.map(|ms| Timestamp::from_millisecond(ms).unwrap()) {
            Some(ts) => (ts.to_string(), Some(ts)),
            None => ("unknown date".to_string(), None),
        }
    }

    fn comment(author: Option<&str>, millis: Option<i64>) -> TimelineItem {
        let (timestamp, instant) = at(millis);
        TimelineItem {
            id: "c".into(),
            kind: ItemKind::Comment,
            timestamp,
            instant,
            author_id: author.map(String::from),
            payload: ItemPayload::Comment(CommentPayload {
                text: "text".into(),
                is_pinned: false,
            }),
            raw: None,
        }
    }

    fn change(author: &str, field: &str, millis: i64) -> TimelineItem {
        let (timestamp, instant) = at(Some(millis));
        TimelineItem {
            id: "a".into(),
            kind: ItemKind::Activity,
            timestamp,
            instant,
            author_id: Some(author.into()),
            payload: ItemPayload::Activity(ActivityPayload {
                activity_type: ActivityKind::FieldChange.label().into(),
                activity_kind: ActivityKind::FieldChange,
                field: Some(field.into()),
                added_values: Some(vec!["x".into()]),
                removed_values: None,
            }),
            raw: None,
        }
    }

    fn directory() -> UserDirectory {
        let mut dir = UserDirectory::new();
        dir.register(&UserRef {
            id: Some("alice".into()),
            full_name: Some("Alice Smith".into()),
            ..Default::default()
        });
        dir
    }

    #[test]
    fn empty_timeline_has_no_contributors() {
        assert_eq!(summarize_contributors(&[], &directory()), None);
    }

    #[test]
    fn anonymous_items_are_skipped() {
        let timeline = vec![comment(None, Some(1_000)), comment(None, None)];
        assert_eq!(summarize_contributors(&timeline, &directory()), None);
    }

    #[test]
    fn repeated_actions_merge_into_one_contributor() {
        let timeline = vec![
            change("alice", "Priority", 1_000),
            comment(Some("alice"), Some(2_000)),
            change("alice", "Priority", 3_000),
            change("alice", "Stage", 4_000),
        ];
        let contributors = summarize_contributors(&timeline, &directory()).unwrap();
        assert_eq!(contributors.len(), 1);
        let alice = &contributors[0];
        assert_eq!(alice.name, "Alice Smith");
        assert_eq!(
            alice.actions,
            vec!["changed Priority", "commented", "changed Stage"]
        );
        assert_eq!(alice.last_active_timestamp, "1970-01-01T00:00:04Z");
    }

    #[test]
    fn last_active_is_the_maximum_seen() {
        let timeline = vec![
            comment(Some("bob"), Some(5_000)),
            comment(Some("bob"), None),
            comment(Some("bob"), Some(2_000)),
        ];
        let contributors = summarize_contributors(&timeline, &directory()).unwrap();
        assert_eq!(contributors[0].last_active_timestamp, "1970-01-01T00:00:05Z");
        assert_eq!(contributors[0].name, "bob");
    }

    #[test]
    fn undated_only_contributor_reports_unknown_date() {
        let timeline = vec![comment(Some("bob"), None)];
        let contributors = summarize_contributors(&timeline, &directory()).unwrap();
        assert_eq!(contributors[0].last_active_timestamp, "unknown date");
    }

    #[test]
    fn ordered_by_last_activity_descending_with_stable_ties() {
        let timeline = vec![
            comment(Some("early"), Some(1_000)),
            comment(Some("tie-a"), Some(3_000)),
            comment(Some("tie-b"), Some(3_000)),
            comment(Some("late"), Some(9_000)),
        ];
        let contributors = summarize_contributors(&timeline, &directory()).unwrap();
        let order: Vec<&str> = contributors.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(order, vec!["late", "tie-a", "tie-b", "early"]);
    }

    #[test]
    fn comment_postings_and_comments_are_described_differently() {
        let mut posting = comment(Some("alice"), Some(1_000));
        posting.kind = ItemKind::Activity;
        assert_eq!(describe_action(&posting), "added comment");
        assert_eq!(describe_action(&comment(Some("alice"), None)), "commented");
    }
}
