//! STATUS attributes.

use std::num::NonZeroU32;

/// `status-att`, the attribute names requested by a STATUS command.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusDataItemName {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
    /// `HIGHESTMODSEQ` (RFC 7162)
    HighestModSeq,
}

/// `status-att-val`, an attribute with its value in a STATUS response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusDataItem {
    Messages(u32),
    Recent(u32),
    UidNext(NonZeroU32),
    UidValidity(NonZeroU32),
    Unseen(u32),
    /// `HIGHESTMODSEQ` (RFC 7162); `0` means the mailbox does not support
    /// mod-sequences.
    HighestModSeq(u64),
}
