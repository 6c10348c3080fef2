//! METADATA (RFC 5464) parsing.

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::map,
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

use crate::{
    core::NonEmptyVec,
    parse::{
        core::{astring, keyword_sp, nstring8, number, sp},
        WireResult,
    },
    types::metadata::{
        EntryValue, GetMetadataOption, MetadataDepth, MetadataEntry, MetadataResponse,
    },
};

/// `entry = astring`
pub(crate) fn entry(input: &[u8]) -> WireResult<MetadataEntry> {
    map(astring, |name| MetadataEntry(name.into_bytes()))(input)
}

/// `entries = entry / "(" entry *(SP entry) ")"`
pub(crate) fn entries(input: &[u8]) -> WireResult<NonEmptyVec<MetadataEntry>> {
    alt((
        map(
            delimited(tag(b"("), separated_list1(sp, entry), tag(b")")),
            NonEmptyVec::unvalidated,
        ),
        map(entry, NonEmptyVec::new),
    ))(input)
}

/// `entry SP value`
fn entry_value(input: &[u8]) -> WireResult<EntryValue> {
    map(tuple((entry, sp, nstring8)), |(entry, _, value)| {
        EntryValue { entry, value }
    })(input)
}

/// `entry-values = "(" entry SP value *(SP entry SP value) ")"`
pub(crate) fn entry_values(input: &[u8]) -> WireResult<NonEmptyVec<EntryValue>> {
    map(
        delimited(tag(b"("), separated_list1(sp, entry_value), tag(b")")),
        NonEmptyVec::unvalidated,
    )(input)
}

/// `getmetadata-option = "MAXSIZE" SP number / "DEPTH" SP ("0"/"1"/"infinity")`
pub(crate) fn getmetadata_option(input: &[u8]) -> WireResult<GetMetadataOption> {
    alt((
        map(
            preceded(keyword_sp("MAXSIZE"), number),
            GetMetadataOption::MaxSize,
        ),
        map(
            preceded(
                keyword_sp("DEPTH"),
                alt((
                    map(tag(b"0"), |_| MetadataDepth::Zero),
                    map(tag(b"1"), |_| MetadataDepth::One),
                    map(tag_no_case(b"infinity"), |_| MetadataDepth::Infinity),
                )),
            ),
            GetMetadataOption::Depth,
        ),
    ))(input)
}

/// The payload of an untagged METADATA response (after the mailbox):
/// `entry-values / entry-list`
pub(crate) fn metadata_response(input: &[u8]) -> WireResult<MetadataResponse> {
    alt((
        map(entry_values, MetadataResponse::WithValues),
        map(
            separated_list1(sp, entry),
            |entries| MetadataResponse::WithoutValues(NonEmptyVec::unvalidated(entries)),
        ),
    ))(input)
}
