//! Sequence-set parsing.

use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::map,
    multi::separated_list1,
    sequence::tuple,
};

use crate::{
    core::NonEmptyVec,
    parse::{core::nz_number, WireResult},
    types::sequence::{SeqOrUid, Sequence, SequenceSet},
};

/// `seq-number = nz-number / "*"`
fn seq_number(input: &[u8]) -> WireResult<SeqOrUid> {
    alt((
        map(nz_number, SeqOrUid::Value),
        map(tag(b"*"), |_| SeqOrUid::Asterisk),
    ))(input)
}

/// `seq-range = seq-number ":" seq-number`
///
/// Out-of-order endpoints (`4:1`) are normalized by the constructor.
fn seq_range(input: &[u8]) -> WireResult<Sequence> {
    map(
        tuple((seq_number, tag(b":"), seq_number)),
        |(lo, _, hi)| Sequence::range(lo, hi),
    )(input)
}

/// `sequence-set = (seq-number / seq-range) *("," sequence-set)`
pub(crate) fn sequence_set(input: &[u8]) -> WireResult<SequenceSet> {
    map(
        separated_list1(
            tag(b","),
            alt((seq_range, map(seq_number, Sequence::Single))),
        ),
        |sequences| SequenceSet(NonEmptyVec::unvalidated(sequences)),
    )(input)
}
