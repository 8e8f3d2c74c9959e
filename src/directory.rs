use std::collections::HashMap;

use crate::raw::UserRef;

/// Users seen on an issue, keyed by id in registration order.
///
/// The first registration of an id wins; later sightings of the same id
/// never overwrite its display attributes.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserRef>,
    by_id: HashMap<String, usize>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` under its id. Returns `false` if it has no id or
    /// the id is already known.
    pub fn register(&mut self, user: &UserRef) -> bool {
        let Some(id) = user.id.as_deref().filter(|id| !id.is_empty()) else {
            return false;
        };
        if self.by_id.contains_key(id) {
            return false;
        }
        self.by_id.insert(id.to_string(), self.users.len());
        self.users.push(user.clone());
        true
    }

    pub fn get(&self, id: &str) -> Option<&UserRef> {
        self.by_id.get(id).map(|&i| &self.users[i])
    }

    /// Display name for `id`, falling back to the id itself for unknown
    /// users.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .and_then(UserRef::display_name)
            .unwrap_or(id)
            .to_string()
    }

    /// Reverse lookup: the first registered user with any label (full name,
    /// name, login or email) equal to `label`, ignoring case.
    pub fn find_by_display_name(&self, label: &str) -> Option<&UserRef> {
        let wanted = label.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.users
            .iter()
            .find(|user| user.labels().any(|l| l.to_lowercase() == wanted))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
