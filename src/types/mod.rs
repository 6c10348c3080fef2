//! The grammar AST: a closed family of tagged unions mirroring the IMAP
//! formal syntax. Values are immutable after construction and freely cloned.

pub mod auth;
pub mod body;
pub mod capability;
pub mod command;
pub mod datetime;
pub mod envelope;
pub mod fetch;
pub mod flag;
pub mod id;
pub mod mailbox;
pub mod metadata;
pub mod namespace;
pub mod response;
pub mod search;
pub mod sequence;
pub mod status;
pub mod urlauth;

use crate::{
    core::{Atom, IString},
    types::sequence::SequenceSet,
};

/// A tagged extension (RFC 4466): an opaque label with an optional simple or
/// compound value. Unknown extensions are preserved verbatim so that
/// parse/encode roundtrips hold.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TaggedExtension {
    pub label: Atom,
    pub value: Option<TaggedExtValue>,
}

/// `tagged-ext-val`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TaggedExtValue {
    Sequence(SequenceSet),
    Number(u64),
    String(IString),
    /// Parenthesized compound value; may be empty (`()`).
    List(Vec<TaggedExtValue>),
}
