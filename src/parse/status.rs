//! STATUS attribute parsing.

use nom::{
    branch::alt,
    bytes::streaming::tag_no_case,
    combinator::map,
    sequence::preceded,
};

use crate::{
    parse::{
        core::{keyword_sp, number, number64, nz_number},
        WireResult,
    },
    types::status::{StatusDataItem, StatusDataItemName},
};

/// `status-att`
pub(crate) fn status_att(input: &[u8]) -> WireResult<StatusDataItemName> {
    alt((
        map(tag_no_case(b"MESSAGES"), |_| StatusDataItemName::Messages),
        map(tag_no_case(b"RECENT"), |_| StatusDataItemName::Recent),
        map(tag_no_case(b"UIDNEXT"), |_| StatusDataItemName::UidNext),
        map(tag_no_case(b"UIDVALIDITY"), |_| {
            StatusDataItemName::UidValidity
        }),
        map(tag_no_case(b"UNSEEN"), |_| StatusDataItemName::Unseen),
        map(tag_no_case(b"HIGHESTMODSEQ"), |_| {
            StatusDataItemName::HighestModSeq
        }),
    ))(input)
}

/// `status-att-val` (RFC 3501 + RFC 7162)
pub(crate) fn status_att_val(input: &[u8]) -> WireResult<StatusDataItem> {
    alt((
        map(
            preceded(keyword_sp("MESSAGES"), number),
            StatusDataItem::Messages,
        ),
        map(
            preceded(keyword_sp("RECENT"), number),
            StatusDataItem::Recent,
        ),
        map(
            preceded(keyword_sp("UIDNEXT"), nz_number),
            StatusDataItem::UidNext,
        ),
        map(
            preceded(keyword_sp("UIDVALIDITY"), nz_number),
            StatusDataItem::UidValidity,
        ),
        map(
            preceded(keyword_sp("UNSEEN"), number),
            StatusDataItem::Unseen,
        ),
        map(
            preceded(keyword_sp("HIGHESTMODSEQ"), number64),
            StatusDataItem::HighestModSeq,
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_att_val() {
        let (_, value) = status_att_val(b"MESSAGES 231)").unwrap();
        assert_eq!(value, StatusDataItem::Messages(231));

        let (_, value) = status_att_val(b"HIGHESTMODSEQ 7011231777)").unwrap();
        assert_eq!(value, StatusDataItem::HighestModSeq(7011231777));

        // UIDNEXT must win over UID-prefixed confusion and parse fully.
        let (_, value) = status_att_val(b"UIDNEXT 44292)").unwrap();
        assert_eq!(
            value,
            StatusDataItem::UidNext(std::num::NonZeroU32::new(44292).unwrap())
        );
    }
}
