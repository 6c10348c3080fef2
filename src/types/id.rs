//! ID (RFC 2971) parameters.

use crate::core::{IString, NString, ValidationError};

/// The insertion-ordered field/value list of an ID command or response.
///
/// Duplicate field names are rejected at construction. An empty list is
/// rendered as `NIL` (and `NIL` parses to an empty list).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct IdParameters(pub(crate) Vec<(IString, NString)>);

impl IdParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_pairs(&self) -> &[(IString, NString)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<(IString, NString)>> for IdParameters {
    type Error = ValidationError;

    fn try_from(pairs: Vec<(IString, NString)>) -> Result<Self, Self::Error> {
        for (position, (key, _)) in pairs.iter().enumerate() {
            if pairs[..position].iter().any(|(seen, _)| seen == key) {
                return Err(ValidationError::DuplicateKey { position });
            }
        }

        Ok(Self(pairs))
    }
}
