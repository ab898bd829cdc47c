use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreRuleKind {
    /// Case-insensitive substring of the sender address.
    Sender,
    /// Case-insensitive substring of the body.
    Keyword,
    /// Case-insensitive regex over the body.
    Regex,
}

impl fmt::Display for IgnoreRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreRuleKind::Sender => write!(f, "sender"),
            IgnoreRuleKind::Keyword => write!(f, "keyword"),
            IgnoreRuleKind::Regex => write!(f, "regex"),
        }
    }
}

impl FromStr for IgnoreRuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sender" => Ok(IgnoreRuleKind::Sender),
            "keyword" => Ok(IgnoreRuleKind::Keyword),
            "regex" => Ok(IgnoreRuleKind::Regex),
            other => Err(format!("Unknown ignore rule kind: '{other}'")),
        }
    }
}

/// A user rule that drops messages before parsing. Rules carry no priority;
/// they are evaluated in load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub id: Option<i64>,
    pub kind: IgnoreRuleKind,
    pub pattern: String,
    pub is_active: bool,
}

impl IgnoreRule {
    pub fn new(kind: IgnoreRuleKind, pattern: &str) -> Self {
        IgnoreRule {
            id: None,
            kind,
            pattern: pattern.to_string(),
            is_active: true,
        }
    }
}
