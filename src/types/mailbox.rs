//! Mailbox names and LIST patterns.

use crate::{core::ValidationError, utils::indicators::is_char8};

/// `mailbox = "INBOX" / astring`
///
/// Any name matching `INBOX` case-insensitively denotes the special INBOX
/// mailbox and is canonicalized to [`Mailbox::Inbox`] at construction; all
/// other names preserve their bytes exactly.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Mailbox {
    Inbox,
    Other(MailboxOther),
}

impl Mailbox {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Inbox => b"INBOX",
            Self::Other(other) => other.as_bytes(),
        }
    }
}

impl TryFrom<&[u8]> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case(b"INBOX") {
            return Ok(Self::Inbox);
        }

        Ok(Self::Other(MailboxOther::try_from(value)?))
    }
}

impl TryFrom<Vec<u8>> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl TryFrom<&str> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.as_bytes())
    }
}

impl TryFrom<String> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_bytes())
    }
}

/// A mailbox name other than INBOX.
///
/// Must not be empty and must not contain NUL (the name has to be
/// expressible as an astring or literal).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MailboxOther(pub(crate) Vec<u8>);

impl MailboxOther {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn verify(value: &[u8]) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }

        if let Some(position) = value.iter().position(|b| !is_char8(*b)) {
            return Err(ValidationError::ByteNotAllowed {
                found: value[position],
                position,
            });
        }

        Ok(())
    }
}

impl TryFrom<&[u8]> for MailboxOther {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_vec()))
    }
}

/// `list-mailbox = 1*list-char / string`
///
/// The pattern argument of LIST/LSUB; may contain the `%` and `*` wildcards.
/// An empty pattern is allowed (it is rendered as `""`).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ListMailbox(pub(crate) Vec<u8>);

impl ListMailbox {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn verify(value: &[u8]) -> Result<(), ValidationError> {
        if let Some(position) = value.iter().position(|b| !is_char8(*b)) {
            return Err(ValidationError::ByteNotAllowed {
                found: value[position],
                position,
            });
        }

        Ok(())
    }
}

impl TryFrom<&[u8]> for ListMailbox {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_vec()))
    }
}

impl TryFrom<Vec<u8>> for ListMailbox {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for ListMailbox {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.as_bytes())
    }
}
