//! METADATA (RFC 5464) types.

use crate::core::{NString, NonEmptyVec, ValidationError};
use crate::utils::indicators::is_char8;

/// `entry-name = entry` — the slash-separated name of a metadata entry,
/// e.g. `/shared/comment`. Stored as raw astring bytes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MetadataEntry(pub(crate) Vec<u8>);

impl MetadataEntry {
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

impl TryFrom<&[u8]> for MetadataEntry {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_vec()))
    }
}

impl TryFrom<&str> for MetadataEntry {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.as_bytes())
    }
}

impl TryFrom<Vec<u8>> for MetadataEntry {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

/// An entry together with its value, as used by SETMETADATA and the
/// with-values METADATA response. `NIL` values remove entries.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EntryValue {
    pub entry: MetadataEntry,
    pub value: NString,
}

/// `getmetadata-option`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GetMetadataOption {
    /// `MAXSIZE` — do not return values longer than this.
    MaxSize(u32),
    /// `DEPTH` — also return descendant entries.
    Depth(MetadataDepth),
}

/// The argument of the `DEPTH` option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MetadataDepth {
    /// `0`: only the given entries.
    Zero,
    /// `1`: the entries and their direct children.
    One,
    /// `infinity`: all descendants.
    Infinity,
}

/// The payload of an untagged METADATA response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MetadataResponse {
    /// `metadata-resp ... entry-values`: answer to GETMETADATA.
    WithValues(NonEmptyVec<EntryValue>),
    /// `metadata-resp ... entry-list`: unsolicited change notification.
    WithoutValues(NonEmptyVec<MetadataEntry>),
}
