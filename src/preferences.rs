use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::attribution::AttributionRules;
use crate::render::DEFAULT_TEMPLATE;
use crate::report::ReportOptions;

pub const FILENAME: &str = "issuetrail.toml";

/// Text report template: either an inline Jinja2 string or a path to a
/// template file (relative to the directory holding `issuetrail.toml`).
///
/// In TOML this looks like one of:
///
/// ```toml
/// [report_template]
/// inline = "# {{ report.issueId }}"
///
/// # or
///
/// [report_template]
/// file = "report.md.j2"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReportTemplate {
    Inline(String),
    File(String),
}

impl Default for ReportTemplate {
    fn default() -> Self {
        ReportTemplate::Inline(DEFAULT_TEMPLATE.into())
    }
}

/// User-facing preferences stored in `issuetrail.toml`.
#[derive(Debug, Deserialize)]
pub struct Preferences {
    /// Comment text is cut to this many chars (`0` = never).
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,

    /// Only the most recent activities are kept (`0` = all).
    #[serde(default = "default_max_activities")]
    pub max_activities: usize,

    /// Attach each source record to its timeline item.
    #[serde(default)]
    pub include_raw_data: bool,

    /// Field whose changes set the current assignee.
    #[serde(default = "default_assignee_field")]
    pub assignee_field: String,

    /// Fields whose changes are state transitions.
    #[serde(default = "default_stage_fields")]
    pub stage_fields: Vec<String>,

    /// Entering one of these credits the current assignee.
    #[serde(default = "default_work_states")]
    pub work_states: Vec<String>,

    /// Entering one of these credits whoever made the move.
    #[serde(default = "default_review_states")]
    pub review_states: Vec<String>,

    #[serde(default)]
    pub report_template: ReportTemplate,

    /// Directory `report_template.file` is resolved against.
    #[serde(skip)]
    dir: PathBuf,
}

fn default_max_comment_length() -> usize {
    2000
}

fn default_max_activities() -> usize {
    40
}

fn default_assignee_field() -> String {
    "Assignee".into()
}

fn default_stage_fields() -> Vec<String> {
    vec!["Stage".into(), "State".into()]
}

fn default_work_states() -> Vec<String> {
    vec!["In Progress".into()]
}

fn default_review_states() -> Vec<String> {
    vec!["QA In Progress".into()]
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_comment_length: default_max_comment_length(),
            max_activities: default_max_activities(),
            include_raw_data: false,
            assignee_field: default_assignee_field(),
            stage_fields: default_stage_fields(),
            work_states: default_work_states(),
            review_states: default_review_states(),
            report_template: ReportTemplate::default(),
            dir: PathBuf::from("."),
        }
    }
}

impl Preferences {
    /// Load preferences from `path`, or from `issuetrail.toml` in the
    /// current directory when no path is given.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error. Missing keys are filled in with defaults via serde.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let path = path.map_or_else(|| PathBuf::from(FILENAME), Path::to_path_buf);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };

        let mut prefs: Preferences =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        prefs.dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(prefs)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            max_comment_length: self.max_comment_length,
            max_activities: self.max_activities,
            include_raw_data: self.include_raw_data,
            rules: AttributionRules {
                assignee_field: self.assignee_field.clone(),
                stage_fields: self.stage_fields.clone(),
                work_states: self.work_states.clone(),
                review_states: self.review_states.clone(),
            },
        }
    }

    /// Resolve the report template to a string.
    pub fn load_report_template(&self) -> Result<String> {
        match &self.report_template {
            ReportTemplate::Inline(s) => Ok(s.clone()),
            ReportTemplate::File(filename) => {
                let path = self.dir.join(filename);
                fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))
            }
        }
    }
}
