//! Sequence sets over message numbers and UIDs.

use std::{cmp::Ordering, num::NonZeroU32, str::FromStr};

use crate::core::{NonEmptyVec, ValidationError};

/// A message identifier in a sequence set: either a concrete number or the
/// `*` sentinel denoting the largest identifier in the mailbox.
///
/// `*` compares strictly greater than every concrete value and equal to
/// itself.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SeqOrUid {
    Value(NonZeroU32),
    Asterisk,
}

impl SeqOrUid {
    pub fn value(n: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(n)
            .map(Self::Value)
            .ok_or(ValidationError::OutOfRange)
    }
}

impl Ord for SeqOrUid {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Asterisk, Self::Asterisk) => Ordering::Equal,
            (Self::Asterisk, Self::Value(_)) => Ordering::Greater,
            (Self::Value(_), Self::Asterisk) => Ordering::Less,
            (Self::Value(a), Self::Value(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SeqOrUid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<NonZeroU32> for SeqOrUid {
    fn from(value: NonZeroU32) -> Self {
        Self::Value(value)
    }
}

impl FromStr for SeqOrUid {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "*" {
            return Ok(Self::Asterisk);
        }

        // Leading zeros are not valid in `nz-number`.
        if value.starts_with('0') {
            return Err(ValidationError::OutOfRange);
        }

        let number = value
            .parse::<u32>()
            .map_err(|_| ValidationError::OutOfRange)?;
        Self::value(number)
    }
}

/// `seq-number / seq-range`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sequence {
    Single(SeqOrUid),
    Range(SeqOrUid, SeqOrUid),
}

impl Sequence {
    /// Build a range, swapping the endpoints when `lo > hi`.
    pub fn range(lo: SeqOrUid, hi: SeqOrUid) -> Self {
        if lo > hi {
            Self::Range(hi, lo)
        } else {
            Self::Range(lo, hi)
        }
    }
}

impl From<SeqOrUid> for Sequence {
    fn from(value: SeqOrUid) -> Self {
        Self::Single(value)
    }
}

impl From<NonZeroU32> for Sequence {
    fn from(value: NonZeroU32) -> Self {
        Self::Single(SeqOrUid::Value(value))
    }
}

/// `sequence-set = (seq-number / seq-range) *("," sequence-set)`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SequenceSet(pub NonEmptyVec<Sequence>);

impl From<Sequence> for SequenceSet {
    fn from(sequence: Sequence) -> Self {
        Self(NonEmptyVec::from(sequence))
    }
}

impl From<NonZeroU32> for SequenceSet {
    fn from(value: NonZeroU32) -> Self {
        Self::from(Sequence::from(value))
    }
}

impl TryFrom<Vec<Sequence>> for SequenceSet {
    type Error = ValidationError;

    fn try_from(sequences: Vec<Sequence>) -> Result<Self, Self::Error> {
        Ok(Self(NonEmptyVec::try_from(sequences)?))
    }
}

impl FromStr for SequenceSet {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut sequences = Vec::new();

        for part in value.split(',') {
            match part.split_once(':') {
                None => sequences.push(Sequence::Single(part.parse()?)),
                Some((lo, hi)) => {
                    sequences.push(Sequence::range(lo.parse()?, hi.parse()?));
                }
            }
        }

        Self::try_from(sequences)
    }
}

impl TryFrom<&str> for SequenceSet {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
