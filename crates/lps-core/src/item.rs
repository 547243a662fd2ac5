//! Practice domains.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Practice domain an item (and every attempt on it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "item_type", rename_all = "lowercase"))]
pub enum ItemType {
    /// Vocabulary word
    Word,
    /// Dictation sentence
    Sentence,
    /// Shadowing / pronunciation line
    Shadowing,
}

impl ItemType {
    /// Every domain, in display order.
    pub const ALL: [Self; 3] = [Self::Word, Self::Sentence, Self::Shadowing];

    /// Lowercase wire and storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
            Self::Shadowing => "shadowing",
        }
    }

    /// Whether backlog entries of this domain collapse on identical text.
    ///
    /// The same word routinely appears in several sets; sentences and
    /// shadowing lines are only ever deduplicated by id.
    pub const fn dedupes_by_text(self) -> bool {
        matches!(self, Self::Word)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain string that names no known item type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item type '{0}', expected one of: word, sentence, shadowing")]
pub struct UnknownItemType(pub String);

impl FromStr for ItemType {
    type Err = UnknownItemType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "words" => Ok(Self::Word),
            "sentence" | "sentences" => Ok(Self::Sentence),
            "shadowing" => Ok(Self::Shadowing),
            _ => Err(UnknownItemType(s.to_string())),
        }
    }
}
