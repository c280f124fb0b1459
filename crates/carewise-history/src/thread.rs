use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of conversation threads a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadKind {
    Main,
    FormSpecific,
}

impl ThreadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadKind::Main => "main",
            ThreadKind::FormSpecific => "form-specific",
        }
    }
}

/// Which of a user's threads a request targets.
///
/// The record binding is part of the variant, so "main thread" and
/// "form thread without a record" cannot be confused: the latter does not
/// exist as a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThreadSelector {
    /// The user's single record-independent thread.
    Main,
    /// The thread bound to one submitted record.
    FormSpecific(String),
}

impl ThreadSelector {
    pub fn kind(&self) -> ThreadKind {
        match self {
            ThreadSelector::Main => ThreadKind::Main,
            ThreadSelector::FormSpecific(_) => ThreadKind::FormSpecific,
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            ThreadSelector::Main => None,
            ThreadSelector::FormSpecific(record_id) => Some(record_id),
        }
    }
}

/// Full identity of one thread: owner plus selector.
///
/// Exactly one transcript exists per distinct identity; the store enforces
/// this with an atomic lookup-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadIdentity {
    pub user_id: String,
    pub selector: ThreadSelector,
}

impl ThreadIdentity {
    pub fn main(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            selector: ThreadSelector::Main,
        }
    }

    pub fn form_specific(user_id: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            selector: ThreadSelector::FormSpecific(record_id.into()),
        }
    }
}

impl fmt::Display for ThreadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            ThreadSelector::Main => write!(f, "{}/main", self.user_id),
            ThreadSelector::FormSpecific(record_id) => {
                write!(f, "{}/form-specific/{}", self.user_id, record_id)
            }
        }
    }
}
