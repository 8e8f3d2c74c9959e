//! Credits people with work on an issue by replaying its timeline.
//!
//! The tracker records *what* changed, not who deserves credit for it. A
//! single forward pass keeps track of the current assignee so that a later
//! move into a work state can be credited to the owner, even when somebody
//! else (a lead, a bot) made the move. Moves into review states credit the
//! person who made them.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::directory::UserDirectory;
use crate::timeline::TimelineItem;

/// A person credited with bringing the issue into a tracked state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivelyWorkedContributor {
    pub user_id: String,
    pub name: String,
    /// The state value that triggered the credit, as recorded.
    pub state: String,
}

/// Which fields and state names drive attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionRules {
    pub assignee_field: String,
    pub stage_fields: Vec<String>,
    /// Entering one of these credits the current assignee.
    pub work_states: Vec<String>,
    /// Entering one of these credits the author of the transition.
    pub review_states: Vec<String>,
}

impl AttributionRules {
    fn is_assignee_field(&self, field: &str) -> bool {
        eq_ignore_case(&self.assignee_field, field)
    }

    fn is_stage_field(&self, field: &str) -> bool {
        contains_ignore_case(&self.stage_fields, field)
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn contains_ignore_case(names: &[String], value: &str) -> bool {
    names.iter().any(|n| eq_ignore_case(n, value))
}

/// The state carried between timeline items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionState {
    /// Id of whoever holds the issue at this point in the replay.
    pub current_assignee: Option<String>,
}

/// A credit produced by one transition, before naming and deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub user_id: String,
    pub state: String,
}

/// The transition function: given the state before `item`, return the
/// state after it and the credits it produces. Pure.
pub fn step(
    state: &AttributionState,
    item: &TimelineItem,
    rules: &AttributionRules,
    directory: &UserDirectory,
) -> (AttributionState, Vec<Credit>) {
    let mut next = state.clone();
    let mut credits = Vec::new();

    let Some(activity) = item.activity() else {
        return (next, credits);
    };
    let (Some(field), Some(added)) = (activity.field.as_deref(), activity.added_values.as_ref())
    else {
        return (next, credits);
    };

    if rules.is_assignee_field(field) {
        match added
            .iter()
            .find_map(|label| directory.find_by_display_name(label))
            .and_then(|user| user.id.clone())
        {
            Some(id) => next.current_assignee = Some(id),
            // An unresolved name keeps the previous assignee.
            None if !added.is_empty() => {
                debug!(item = %item.id, values = ?added, "assignee not found in directory");
            }
            None => {}
        }
    } else if rules.is_stage_field(field) {
        for value in added {
            let credited = if contains_ignore_case(&rules.work_states, value) {
                state.current_assignee.as_ref()
            } else if contains_ignore_case(&rules.review_states, value) {
                item.author_id.as_ref()
            } else {
                continue;
            };
            match credited {
                Some(user_id) => credits.push(Credit {
                    user_id: user_id.clone(),
                    state: value.clone(),
                }),
                None => debug!(item = %item.id, state = %value, "no one to credit"),
            }
        }
    }

    (next, credits)
}

/// Replay `timeline` (already in chronological order) and return every
/// credit in discovery order. Each `(user, state)` pair appears at most
/// once; state names compare case-insensitively.
pub fn attribute(
    timeline: &[TimelineItem],
    rules: &AttributionRules,
    directory: &UserDirectory,
) -> Vec<ActivelyWorkedContributor> {
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let (_, credited) = timeline.iter().fold(
        (AttributionState::default(), Vec::new()),
        |(state, mut credited), item| {
            let (next, credits) = step(&state, item, rules, directory);
            for credit in credits {
                let key = (credit.user_id.clone(), credit.state.to_lowercase());
                if seen.insert(key) {
                    credited.push(ActivelyWorkedContributor {
                        name: directory.display_name(&credit.user_id),
                        user_id: credit.user_id,
                        state: credit.state,
                    });
                }
            }
            (next, credited)
        },
    );
    credited
}
