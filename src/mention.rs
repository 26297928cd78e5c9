//! Mentions and the per-document mention store.
//!
//! A mention is a located referring expression (a pronoun, a name, a noun
//! phrase). Mentions arrive from an external detector with a stable
//! [`MentionId`]; the resolver only ever reads their position and kind and
//! writes their entity `group` once.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable mention identifier, assigned by the detector before ordering.
///
/// # Examples
///
/// ```
/// use corelax::MentionId;
///
/// let id = MentionId::new(4);
/// assert_eq!(id.get(), 4);
/// assert_eq!(id.to_string(), "4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionId(u32);

impl MentionId {
    /// Creates a mention ID from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MentionId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<MentionId> for u32 {
    fn from(id: MentionId) -> Self {
        id.0
    }
}

/// Syntactic kind of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    /// A personal, possessive or demonstrative pronoun
    Pronoun,
    /// A proper name
    ProperNoun,
    /// A common noun phrase
    NounPhrase,
    /// A coordination of several mentions
    Composite,
    /// A verbal or clausal mention
    VerbPhrase,
}

impl MentionKind {
    /// Solving-order class: proper nouns first, pronouns last.
    ///
    /// Verb phrases share the noun-phrase class.
    #[must_use]
    pub const fn priority_class(self) -> u8 {
        match self {
            Self::ProperNoun => 0,
            Self::NounPhrase | Self::Composite | Self::VerbPhrase => 1,
            Self::Pronoun => 2,
        }
    }

    /// Returns true for pronouns.
    #[must_use]
    pub const fn is_pronoun(self) -> bool {
        matches!(self, Self::Pronoun)
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pronoun => write!(f, "pronoun"),
            Self::ProperNoun => write!(f, "proper_noun"),
            Self::NounPhrase => write!(f, "noun_phrase"),
            Self::Composite => write!(f, "composite"),
            Self::VerbPhrase => write!(f, "verb_phrase"),
        }
    }
}

/// Multiplier applied to the sentence index when computing text offsets.
pub const SENTENCE_STRIDE: i64 = 1000;

/// A referring expression located in a parsed document.
///
/// # Examples
///
/// ```
/// use corelax::{Mention, MentionId, MentionKind};
///
/// let m = Mention::new(MentionId::new(0), MentionKind::ProperNoun, 2, 3, 4);
/// assert_eq!(m.begin_offset(), 2003);
/// assert_eq!(m.end_offset(), 2004);
/// assert!(m.group.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Stable identity
    pub id: MentionId,
    /// Syntactic kind
    pub kind: MentionKind,
    /// Index of the sentence containing the mention
    pub sentence_index: u32,
    /// First word position within the sentence
    pub pos_begin: u32,
    /// Last word position within the sentence (inclusive)
    pub pos_end: u32,
    /// Entity group, unset until resolved
    #[serde(default)]
    pub group: Option<MentionId>,
}

impl Mention {
    /// Creates an unresolved mention.
    #[must_use]
    pub fn new(id: MentionId, kind: MentionKind, sentence_index: u32, pos_begin: u32, pos_end: u32) -> Self {
        Self {
            id,
            kind,
            sentence_index,
            pos_begin,
            pos_end,
            group: None,
        }
    }

    /// Document-wide offset of the first word.
    #[must_use]
    pub fn begin_offset(&self) -> i64 {
        i64::from(self.sentence_index) * SENTENCE_STRIDE + i64::from(self.pos_begin)
    }

    /// Document-wide offset of the last word.
    #[must_use]
    pub fn end_offset(&self) -> i64 {
        i64::from(self.sentence_index) * SENTENCE_STRIDE + i64::from(self.pos_end)
    }

    /// Validate span consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pos_begin > self.pos_end {
            return Err(ValidationError::InvalidSpan {
                id: self.id,
                begin: self.pos_begin,
                end: self.pos_end,
            });
        }
        Ok(())
    }
}

/// Ordered mentions of one document, addressable by id.
///
/// Insertion (detection) order is preserved. Identifiers must be unique.
#[derive(Debug, Clone, Default)]
pub struct MentionStore {
    mentions: Vec<Mention>,
    index: HashMap<MentionId, usize>,
}

impl MentionStore {
    /// Build a store, rejecting duplicate ids and inverted spans.
    pub fn new(mentions: Vec<Mention>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(mentions.len());
        for (pos, mention) in mentions.iter().enumerate() {
            mention.validate()?;
            if index.insert(mention.id, pos).is_some() {
                return Err(ValidationError::DuplicateMentionId { id: mention.id });
            }
        }
        Ok(Self { mentions, index })
    }

    /// Number of mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Returns true if the document has no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Mention at a detection-order position.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<&Mention> {
        self.mentions.get(pos)
    }

    /// Mention by id.
    #[must_use]
    pub fn get(&self, id: MentionId) -> Option<&Mention> {
        self.index.get(&id).map(|&pos| &self.mentions[pos])
    }

    /// Mentions in detection order.
    #[must_use]
    pub fn as_slice(&self) -> &[Mention] {
        &self.mentions
    }

    /// Iterate over mentions in detection order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mention> {
        self.mentions.iter()
    }

    /// Record the entity group of the mention at `pos`.
    pub(crate) fn assign_group(&mut self, pos: usize, group: MentionId) {
        let mention = &mut self.mentions[pos];
        debug_assert!(mention.group.is_none(), "mention {} resolved twice", mention.id);
        mention.group = Some(group);
    }

    /// Consume the store, returning the mentions in detection order.
    #[must_use]
    pub fn into_mentions(self) -> Vec<Mention> {
        self.mentions
    }
}

/// A mention emitted to the document output, with its resolved group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMention {
    /// Mention identity
    pub id: MentionId,
    /// Entity group (the id of the chain's representative mention)
    pub group: MentionId,
    /// Syntactic kind
    pub kind: MentionKind,
    /// Sentence index
    pub sentence_index: u32,
    /// First word position
    pub pos_begin: u32,
    /// Last word position
    pub pos_end: u32,
}

impl ResolvedMention {
    pub(crate) fn from_mention(mention: &Mention, group: MentionId) -> Self {
        Self {
            id: mention.id,
            group,
            kind: mention.kind,
            sentence_index: mention.sentence_index,
            pos_begin: mention.pos_begin,
            pos_end: mention.pos_end,
        }
    }
}
