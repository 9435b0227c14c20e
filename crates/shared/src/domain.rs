use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a demo. The id doubles as the storage key of the demo
/// record, format `demo:<creation-timestamp-millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemoId(pub String);

impl DemoId {
    pub fn from_creation_millis(millis: i64) -> Self {
        Self(format!("{}{millis}", crate::keyspace::DEMO_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DemoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demo {
    pub id: DemoId,
    pub headline: String,
}

/// The three fixed reaction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Smile,
    Meh,
    Frown,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 3] = [Self::Smile, Self::Meh, Self::Frown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smile => "smile",
            Self::Meh => "meh",
            Self::Frown => "frown",
        }
    }
}

/// Per-demo reaction counts. A demo with no reactions tallies all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub smile: u64,
    pub meh: u64,
    pub frown: u64,
}

impl ReactionTally {
    pub fn count(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Smile => self.smile,
            ReactionKind::Meh => self.meh,
            ReactionKind::Frown => self.frown,
        }
    }

    pub fn record(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::Smile => self.smile += 1,
            ReactionKind::Meh => self.meh += 1,
            ReactionKind::Frown => self.frown += 1,
        }
    }
}
