use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Display string for a change value that carries no usable label.
pub const UNKNOWN_VALUE: &str = "Unknown value";

// ===================================================================
// Lenient field deserializers
// ===================================================================
//
// The tracker's payloads are not contractually shaped, so every field is
// read through one of these: a value of the wrong shape becomes `None`
// instead of failing the whole record.

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_string(&Value::deserialize(deserializer)?))
}

fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Strings pass through, numbers and booleans are stringified, anything
/// else has no scalar form.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

// ===================================================================
// Users
// ===================================================================

/// A user reference as the tracker embeds it in authors, assignees and
/// user-valued fields. Identity is `id`; everything else is display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

impl UserRef {
    /// `fullName → name → login → id`, skipping empty strings.
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.full_name)
            .or_else(|| non_empty(&self.name))
            .or_else(|| non_empty(&self.login))
            .or_else(|| non_empty(&self.id))
    }

    /// Every label a person might be referred to by in a change value.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        [&self.full_name, &self.name, &self.login, &self.email]
            .into_iter()
            .filter_map(non_empty)
    }
}

// ===================================================================
// Timestamps
// ===================================================================

/// A timestamp as sent by the tracker: epoch milliseconds or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

// ===================================================================
// Change values (added / removed / field values)
// ===================================================================

/// `added`, `removed` and custom field values arrive either as an array
/// or as a single value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChangeValues {
    Many(Vec<ChangeValue>),
    One(ChangeValue),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Object(ValueObject),
    Scalar(Value),
}

/// An object-shaped change value. Enum values, users, tags, attachments
/// and comments all share this loose shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueObject {
    #[serde(default, rename = "$type", deserialize_with = "lenient_string")]
    pub value_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub presentation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<u64>,
}

impl ValueObject {
    /// `name → text → presentation → "Unknown value"`.
    pub fn display(&self) -> &str {
        non_empty(&self.name)
            .or_else(|| non_empty(&self.text))
            .or_else(|| non_empty(&self.presentation))
            .unwrap_or(UNKNOWN_VALUE)
    }

    /// The value as a user, when it looks like one (has an id and some
    /// user-only attribute or an explicit `User` type).
    pub fn as_user(&self) -> Option<UserRef> {
        self.id.as_ref()?;
        let is_user = self.value_type.as_deref() == Some("User")
            || self.login.is_some()
            || self.full_name.is_some()
            || self.email.is_some();
        is_user.then(|| UserRef {
            id: self.id.clone(),
            name: self.name.clone(),
            full_name: self.full_name.clone(),
            login: self.login.clone(),
            email: self.email.clone(),
        })
    }
}

impl ChangeValue {
    pub fn display(&self) -> String {
        match self {
            ChangeValue::Object(obj) => obj.display().to_string(),
            ChangeValue::Scalar(Value::Null) => UNKNOWN_VALUE.to_string(),
            ChangeValue::Scalar(Value::String(s)) => s.clone(),
            ChangeValue::Scalar(other) => other.to_string(),
        }
    }

    pub fn as_object(&self) -> Option<&ValueObject> {
        match self {
            ChangeValue::Object(obj) => Some(obj),
            ChangeValue::Scalar(_) => None,
        }
    }
}

impl ChangeValues {
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeValue> {
        match self {
            ChangeValues::Many(values) => values.iter(),
            ChangeValues::One(value) => std::slice::from_ref(value).iter(),
        }
    }

    /// Every value as its display string. An explicit empty array stays
    /// empty; it is never padded.
    pub fn display_values(&self) -> Vec<String> {
        self.iter().map(ChangeValue::display).collect()
    }

    /// User-shaped values, in order.
    pub fn users(&self) -> impl Iterator<Item = UserRef> + '_ {
        self.iter()
            .filter_map(ChangeValue::as_object)
            .filter_map(ValueObject::as_user)
    }
}

// ===================================================================
// Activities
// ===================================================================

/// The activity shapes the tracker produces, discriminated by `$type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    FieldChange,
    CommentAdded,
    IssueCreated,
    WorkItem,
    VisibilityChange,
    Attachment,
    Links,
    Summary,
    Description,
    Other,
}

impl ActivityKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "CustomFieldActivityItem" => Self::FieldChange,
            "CommentActivityItem" => Self::CommentAdded,
            "IssueCreatedActivityItem" => Self::IssueCreated,
            "WorkItemActivityItem" => Self::WorkItem,
            "VisibilityActivityItem"
            | "VisibilityGroupActivityItem"
            | "VisibilityUserActivityItem" => Self::VisibilityChange,
            "AttachmentActivityItem" => Self::Attachment,
            "LinksActivityItem" => Self::Links,
            "SummaryActivityItem" => Self::Summary,
            "DescriptionActivityItem" => Self::Description,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FieldChange => "field-change",
            Self::CommentAdded => "comment-added",
            Self::IssueCreated => "issue-created",
            Self::WorkItem => "work-item",
            Self::VisibilityChange => "visibility-change",
            Self::Attachment => "attachment",
            Self::Links => "links",
            Self::Summary => "summary",
            Self::Description => "description",
            Self::Other => "other",
        }
    }
}

/// A nested `target` / `comment` object. Only the text matters here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NestedText {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

/// One activity record. All shapes share these attributes; which ones are
/// populated depends on the `$type`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawActivity {
    #[serde(default, rename = "$type", deserialize_with = "lenient_string")]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub field: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub added: Option<ChangeValues>,
    #[serde(default, deserialize_with = "lenient")]
    pub removed: Option<ChangeValues>,
    #[serde(default, deserialize_with = "lenient")]
    pub target: Option<NestedText>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment: Option<NestedText>,
}

impl RawActivity {
    pub fn kind(&self) -> ActivityKind {
        self.type_name
            .as_deref()
            .map_or(ActivityKind::Other, ActivityKind::from_type_name)
    }

    /// The changed field's name, only when the descriptor is an object
    /// exposing one.
    pub fn field_name(&self) -> Option<&str> {
        self.field
            .as_ref()?
            .get("name")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Text of a comment posting: `comment.text`, then `target.text`, then
    /// the first added value carrying text.
    pub fn posted_text(&self) -> Option<&str> {
        self.comment
            .as_ref()
            .and_then(|c| c.text.as_deref())
            .or_else(|| self.target.as_ref().and_then(|t| t.text.as_deref()))
            .or_else(|| {
                self.added.as_ref().and_then(|added| {
                    added
                        .iter()
                        .filter_map(ChangeValue::as_object)
                        .find_map(|obj| obj.text.as_deref())
                })
            })
    }

    /// True when nothing usable was recorded at all.
    pub fn is_empty(&self) -> bool {
        self.type_name.is_none()
            && self.id.is_none()
            && self.timestamp.is_none()
            && self.author.is_none()
            && self.field.is_none()
            && self.added.is_none()
            && self.removed.is_none()
            && self.target.is_none()
            && self.comment.is_none()
    }
}

// ===================================================================
// Comments, custom fields, attachments
// ===================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCustomField {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<ChangeValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttachment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<RawTimestamp>,
}

// ===================================================================
// Issue
// ===================================================================

/// A typed record alongside its position and the original JSON it was
/// read from.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub index: usize,
    pub record: T,
    pub raw: Value,
}

/// The provider's issue object, read record by record.
#[derive(Debug, Clone, Default)]
pub struct RawIssue {
    pub id: Option<String>,
    pub id_readable: Option<String>,
    pub summary: Option<String>,
    pub custom_fields: Vec<Parsed<RawCustomField>>,
    pub comments: Vec<Parsed<RawComment>>,
    pub activities: Vec<Parsed<RawActivity>>,
    pub attachments: Vec<Parsed<RawAttachment>>,
}

impl RawIssue {
    /// Read an issue object. Returns the issue and a diagnostic for every
    /// record that had to be dropped; fails only when `value` is not an
    /// object at all.
    pub fn parse(value: &Value) -> Result<(Self, Vec<String>), String> {
        let Value::Object(map) = value else {
            return Err(format!("expected an issue object, got {}", describe(value)));
        };

        let mut diagnostics = Vec::new();
        let text = |key: &str| map.get(key).and_then(scalar_string);

        let issue = Self {
            id: text("id"),
            id_readable: text("idReadable"),
            summary: text("summary"),
            custom_fields: parse_records(map, "customFields", &mut diagnostics),
            comments: parse_records(map, "comments", &mut diagnostics),
            activities: parse_records(map, "activities", &mut diagnostics),
            attachments: parse_records(map, "attachments", &mut diagnostics),
        };
        Ok((issue, diagnostics))
    }
}

/// Parse `map[key]` as an array of records. Absent or null means none;
/// any other non-array is a diagnostic.
fn parse_records<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    diagnostics: &mut Vec<String>,
) -> Vec<Parsed<T>> {
    let items = match map.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            diagnostics.push(format!("{key}: expected an array, got {}", describe(other)));
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, raw) in items.iter().enumerate() {
        if !raw.is_object() {
            diagnostics.push(format!(
                "{key}[{index}]: expected an object, got {}",
                describe(raw)
            ));
            continue;
        }
        match serde_json::from_value::<T>(raw.clone()) {
            Ok(record) => records.push(Parsed {
                index,
                record,
                raw: raw.clone(),
            }),
            Err(e) => diagnostics.push(format!("{key}[{index}]: {e}")),
        }
    }
    records
}
