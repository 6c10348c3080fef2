//! SEARCH program and ESEARCH result parsing.

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, opt},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    core::NonEmptyVec,
    parse::{
        core::{astring, atom, charset, keyword_sp, number, number64, nz_number, sp},
        datetime::date,
        sequence::sequence_set,
        WireResult,
    },
    types::search::{SearchKey, SearchReturnData, SearchReturnOption},
};

/// The argument part of a SEARCH command (after `SEARCH`):
/// `[SP "RETURN" SP search-return-opts] [SP "CHARSET" SP charset] 1*(SP search-key)`
pub(crate) fn search_args(
    input: &[u8],
) -> WireResult<(
    Vec<SearchReturnOption>,
    Option<crate::core::Charset>,
    NonEmptyVec<SearchKey>,
)> {
    let (remaining, (return_options, charset, criteria)) = tuple((
        map(
            opt(preceded(
                tuple((sp, tag_no_case(b"RETURN"), sp)),
                delimited(
                    tag(b"("),
                    separated_list0(sp, search_return_opt),
                    tag(b")"),
                ),
            )),
            Option::unwrap_or_default,
        ),
        opt(preceded(
            tuple((sp, tag_no_case(b"CHARSET"), sp)),
            charset,
        )),
        map(
            nom::multi::many1(preceded(sp, search_key)),
            NonEmptyVec::unvalidated,
        ),
    ))(input)?;

    Ok((remaining, (return_options, charset, criteria)))
}

/// `search-return-opt = "MIN" / "MAX" / "ALL" / "COUNT"`
fn search_return_opt(input: &[u8]) -> WireResult<SearchReturnOption> {
    alt((
        map(tag_no_case(b"MIN"), |_| SearchReturnOption::Min),
        map(tag_no_case(b"MAX"), |_| SearchReturnOption::Max),
        map(tag_no_case(b"ALL"), |_| SearchReturnOption::All),
        map(tag_no_case(b"COUNT"), |_| SearchReturnOption::Count),
    ))(input)
}

/// Nesting budget for `NOT`, `OR`, and parenthesized conjunctions.
const MAX_DEPTH: usize = 32;

/// `search-key`
pub(crate) fn search_key(input: &[u8]) -> WireResult<SearchKey> {
    search_key_limited(input, MAX_DEPTH)
}

fn search_key_limited(input: &[u8], depth: usize) -> WireResult<SearchKey> {
    if depth == 0 {
        return Err(nom::Err::Failure(crate::parse::WireParseError {
            input,
            kind: crate::parse::WireErrorKind::TooDeep,
        }));
    }

    alt((
        move |input| search_key_a_to_m(input, depth - 1),
        move |input| search_key_n_to_s(input, depth - 1),
        search_key_t_to_z,
    ))(input)
}

fn search_key_a_to_m(input: &[u8], depth: usize) -> WireResult<SearchKey> {
    alt((
        map(
            delimited(
                tag(b"("),
                separated_list1(sp, move |input| search_key_limited(input, depth)),
                tag(b")"),
            ),
            |keys| SearchKey::And(NonEmptyVec::unvalidated(keys)),
        ),
        map(tag_no_case(b"ALL"), |_| SearchKey::All),
        map(tag_no_case(b"ANSWERED"), |_| SearchKey::Answered),
        map(preceded(keyword_sp("BCC"), astring), SearchKey::Bcc),
        map(preceded(keyword_sp("BEFORE"), date), SearchKey::Before),
        map(preceded(keyword_sp("BODY"), astring), SearchKey::Body),
        map(preceded(keyword_sp("CC"), astring), SearchKey::Cc),
        map(tag_no_case(b"DELETED"), |_| SearchKey::Deleted),
        map(tag_no_case(b"DRAFT"), |_| SearchKey::Draft),
        map(tag_no_case(b"FLAGGED"), |_| SearchKey::Flagged),
        map(preceded(keyword_sp("FROM"), astring), SearchKey::From),
        map(
            tuple((keyword_sp("HEADER"), astring, sp, astring)),
            |(_, field, _, value)| SearchKey::Header(field, value),
        ),
        map(preceded(keyword_sp("KEYWORD"), atom), SearchKey::Keyword),
        map(preceded(keyword_sp("LARGER"), number), SearchKey::Larger),
        map(preceded(keyword_sp("MODSEQ"), number64), SearchKey::ModSeq),
    ))(input)
}

fn search_key_n_to_s(input: &[u8], depth: usize) -> WireResult<SearchKey> {
    alt((
        map(tag_no_case(b"NEW"), |_| SearchKey::New),
        map(
            preceded(keyword_sp("NOT"), move |input| {
                search_key_limited(input, depth)
            }),
            |key| SearchKey::Not(Box::new(key)),
        ),
        map(tag_no_case(b"OLD"), |_| SearchKey::Old),
        map(preceded(keyword_sp("ON"), date), SearchKey::On),
        map(
            tuple((
                keyword_sp("OR"),
                move |input| search_key_limited(input, depth),
                sp,
                move |input| search_key_limited(input, depth),
            )),
            |(_, left, _, right)| SearchKey::Or(Box::new(left), Box::new(right)),
        ),
        map(tag_no_case(b"RECENT"), |_| SearchKey::Recent),
        map(
            preceded(keyword_sp("SENTBEFORE"), date),
            SearchKey::SentBefore,
        ),
        map(preceded(keyword_sp("SENTON"), date), SearchKey::SentOn),
        map(
            preceded(keyword_sp("SENTSINCE"), date),
            SearchKey::SentSince,
        ),
        map(tag_no_case(b"SEEN"), |_| SearchKey::Seen),
        map(preceded(keyword_sp("SINCE"), date), SearchKey::Since),
        map(preceded(keyword_sp("SMALLER"), number), SearchKey::Smaller),
        map(preceded(keyword_sp("SUBJECT"), astring), SearchKey::Subject),
    ))(input)
}

fn search_key_t_to_z(input: &[u8]) -> WireResult<SearchKey> {
    alt((
        map(preceded(keyword_sp("TEXT"), astring), SearchKey::Text),
        map(preceded(keyword_sp("TO"), astring), SearchKey::To),
        map(preceded(keyword_sp("UID"), sequence_set), SearchKey::Uid),
        map(tag_no_case(b"UNANSWERED"), |_| SearchKey::Unanswered),
        map(tag_no_case(b"UNDELETED"), |_| SearchKey::Undeleted),
        map(tag_no_case(b"UNDRAFT"), |_| SearchKey::Undraft),
        map(tag_no_case(b"UNFLAGGED"), |_| SearchKey::Unflagged),
        map(
            preceded(keyword_sp("UNKEYWORD"), atom),
            SearchKey::Unkeyword,
        ),
        map(tag_no_case(b"UNSEEN"), |_| SearchKey::Unseen),
        map(sequence_set, SearchKey::SequenceSet),
    ))(input)
}

/// `search-return-data` (RFC 4731 + RFC 7162)
pub(crate) fn search_return_data(input: &[u8]) -> WireResult<SearchReturnData> {
    alt((
        map(
            preceded(keyword_sp("MIN"), nz_number),
            SearchReturnData::Min,
        ),
        map(
            preceded(keyword_sp("MAX"), nz_number),
            SearchReturnData::Max,
        ),
        map(
            preceded(keyword_sp("ALL"), sequence_set),
            SearchReturnData::All,
        ),
        map(
            preceded(keyword_sp("COUNT"), number),
            SearchReturnData::Count,
        ),
        map(
            preceded(keyword_sp("MODSEQ"), number64),
            SearchReturnData::ModSeq,
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keys() {
        let (_, key) = search_key(b"UNSEEN ").unwrap();
        assert_eq!(key, SearchKey::Unseen);

        let (_, key) = search_key(b"1:5,8 ").unwrap();
        assert!(matches!(key, SearchKey::SequenceSet(_)));

        let (_, key) = search_key(b"MODSEQ 620162338 ").unwrap();
        assert_eq!(key, SearchKey::ModSeq(620162338));
    }

    #[test]
    fn test_nested_keys() {
        let (_, key) = search_key(b"OR SEEN NOT DRAFT ").unwrap();
        assert_eq!(
            key,
            SearchKey::Or(
                Box::new(SearchKey::Seen),
                Box::new(SearchKey::Not(Box::new(SearchKey::Draft))),
            )
        );

        let (_, key) = search_key(b"(SEEN DRAFT) ").unwrap();
        match key {
            SearchKey::And(keys) => assert_eq!(keys.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_search_args() {
        let (_, (options, charset, criteria)) =
            search_args(b" RETURN (MIN COUNT) CHARSET UTF-8 UNSEEN DRAFT\r\n").unwrap();
        assert_eq!(
            options,
            vec![SearchReturnOption::Min, SearchReturnOption::Count]
        );
        assert_eq!(charset.unwrap().inner(), "UTF-8");
        assert_eq!(criteria.len(), 2);
    }
}
