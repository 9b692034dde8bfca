//! KDL schema for config.kdl.
//!
//! ```kdl
//! users-file "users.txt"
//! questions-file "questions.txt"
//! anonymous-policy "advisory"  // or "enforce"
//! action-log #true
//! ```
//!
//! Unknown nodes are ignored. Values of the wrong type are reported as errors
//! rather than silently dropped, since a typo in a file path should not send
//! writes somewhere unexpected.

use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What happens when someone asks anonymously and the recipient does not
/// accept anonymous questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymousPolicy {
    /// Print a note and create the question anyway
    #[default]
    Advisory,
    /// Refuse to create the question
    Enforce,
}

impl AnonymousPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnonymousPolicy::Advisory => "advisory",
            AnonymousPolicy::Enforce => "enforce",
        }
    }
}

impl FromStr for AnonymousPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "advisory" => Ok(AnonymousPolicy::Advisory),
            "enforce" => Ok(AnonymousPolicy::Enforce),
            _ => Err(Error::Config(format!(
                "anonymous-policy must be \"advisory\" or \"enforce\", got {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for AnonymousPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings read from config.kdl. Unset values fall through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskmeConfig {
    pub users_file: Option<PathBuf>,
    pub questions_file: Option<PathBuf>,
    pub anonymous_policy: Option<AnonymousPolicy>,
    pub action_log: Option<bool>,
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(KdlEntry::value)
}

fn string_value(doc: &KdlDocument, name: &str) -> Result<Option<String>> {
    match first_value(doc, name) {
        None => Ok(None),
        Some(value) => value
            .as_string()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| Error::Config(format!("{} must be a string", name))),
    }
}

fn bool_value(doc: &KdlDocument, name: &str) -> Result<Option<bool>> {
    match first_value(doc, name) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| Error::Config(format!("{} must be #true or #false", name))),
    }
}

impl AskmeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config.kdl document.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        Ok(Self {
            users_file: string_value(doc, "users-file")?.map(PathBuf::from),
            questions_file: string_value(doc, "questions-file")?.map(PathBuf::from),
            anonymous_policy: string_value(doc, "anonymous-policy")?
                .map(|s| s.parse())
                .transpose()?,
            action_log: bool_value(doc, "action-log")?,
        })
    }

    /// Parse config.kdl text.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: KdlDocument = text
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse KDL: {}", e)))?;
        Self::from_kdl(&doc)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref path) = self.users_file {
            let mut node = KdlNode::new("users-file");
            node.push(KdlEntry::new(KdlValue::String(path.display().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref path) = self.questions_file {
            let mut node = KdlNode::new("questions-file");
            node.push(KdlEntry::new(KdlValue::String(path.display().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(policy) = self.anonymous_policy {
            let mut node = KdlNode::new("anonymous-policy");
            node.push(KdlEntry::new(KdlValue::String(policy.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(enabled) = self.action_log {
            let mut node = KdlNode::new("action-log");
            node.push(KdlEntry::new(KdlValue::Bool(enabled)));
            doc.nodes_mut().push(node);
        }

        doc
    }
}
