//! SEARCH keys and ESEARCH (RFC 4731) result options.

use std::num::NonZeroU32;

use crate::{
    core::{Atom, IString, NonEmptyVec, Tag},
    types::{datetime::NaiveDate, sequence::SequenceSet},
};

/// `search-key`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SearchKey {
    /// A parenthesized conjunction: `"(" search-key *(SP search-key) ")"`
    And(NonEmptyVec<SearchKey>),
    SequenceSet(SequenceSet),
    All,
    Answered,
    Bcc(IString),
    Before(NaiveDate),
    Body(IString),
    Cc(IString),
    Deleted,
    Draft,
    Flagged,
    From(IString),
    Header(IString, IString),
    Keyword(Atom),
    Larger(u32),
    /// `MODSEQ mod-sequence-valzer` (RFC 7162)
    ModSeq(u64),
    New,
    Not(Box<SearchKey>),
    Old,
    On(NaiveDate),
    Or(Box<SearchKey>, Box<SearchKey>),
    Recent,
    Seen,
    SentBefore(NaiveDate),
    SentOn(NaiveDate),
    SentSince(NaiveDate),
    Since(NaiveDate),
    Smaller(u32),
    Subject(IString),
    Text(IString),
    To(IString),
    Uid(SequenceSet),
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unkeyword(Atom),
    Unseen,
}

/// `search-return-opt` (RFC 4731)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SearchReturnOption {
    Min,
    Max,
    All,
    Count,
}

/// The payload of an untagged `ESEARCH` response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExtendedSearchData {
    /// `(TAG "...")` — the command this result answers.
    pub correlator: Option<Tag>,
    /// Whether the results are UIDs.
    pub uid: bool,
    pub returns: Vec<SearchReturnData>,
}

/// `search-return-data` (RFC 4731, MODSEQ from RFC 7162)
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SearchReturnData {
    Min(NonZeroU32),
    Max(NonZeroU32),
    All(SequenceSet),
    Count(u32),
    ModSeq(u64),
}
