//! FETCH attribute parsing: requested names (command side), returned values
//! (response side), and section specifiers.

use std::num::NonZeroU32;

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, opt},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    core::{IString, NonEmptyVec},
    parse::{
        body::body,
        core::{astring, keyword_sp, nstring, nstring8, number, number64, nz_number, sp},
        datetime::date_time,
        envelope::envelope,
        flag::flag_fetch,
        WireResult,
    },
    types::fetch::{MessageDataItem, MessageDataItemName, Part, Partial, Section},
};

// ----- sections -----------------------------------------------------------

/// `section-part = nz-number *("." nz-number)`
fn section_part(input: &[u8]) -> WireResult<Part> {
    map(separated_list1(tag(b"."), nz_number), |numbers| {
        Part(NonEmptyVec::unvalidated(numbers))
    })(input)
}

/// `header-list = "(" header-fld-name *(SP header-fld-name) ")"`
fn header_list(input: &[u8]) -> WireResult<NonEmptyVec<IString>> {
    map(
        delimited(tag(b"("), separated_list1(sp, astring), tag(b")")),
        NonEmptyVec::unvalidated,
    )(input)
}

enum MsgText {
    Header,
    HeaderFields(NonEmptyVec<IString>),
    HeaderFieldsNot(NonEmptyVec<IString>),
    Text,
}

/// `section-msgtext = "HEADER" /
///                    "HEADER.FIELDS" [".NOT"] SP header-list /
///                    "TEXT"`
fn section_msgtext(input: &[u8]) -> WireResult<MsgText> {
    alt((
        map(
            preceded(keyword_sp("HEADER.FIELDS.NOT"), header_list),
            MsgText::HeaderFieldsNot,
        ),
        map(
            preceded(keyword_sp("HEADER.FIELDS"), header_list),
            MsgText::HeaderFields,
        ),
        map(tag_no_case(b"HEADER"), |_| MsgText::Header),
        map(tag_no_case(b"TEXT"), |_| MsgText::Text),
    ))(input)
}

/// `section = "[" [section-spec] "]"`
pub(crate) fn section(input: &[u8]) -> WireResult<Option<Section>> {
    delimited(tag(b"["), opt(section_spec), tag(b"]"))(input)
}

/// `section-spec = section-msgtext / (section-part ["." section-text])`
fn section_spec(input: &[u8]) -> WireResult<Section> {
    alt((
        |input| {
            let (remaining, part) = section_part(input)?;
            let (remaining, text) = opt(preceded(tag(b"."), section_text))(remaining)?;

            let section = match text {
                None => Section::Part(part),
                Some(SectionText::Mime) => Section::Mime(part),
                Some(SectionText::MsgText(MsgText::Header)) => Section::Header(Some(part)),
                Some(SectionText::MsgText(MsgText::HeaderFields(fields))) => {
                    Section::HeaderFields(Some(part), fields)
                }
                Some(SectionText::MsgText(MsgText::HeaderFieldsNot(fields))) => {
                    Section::HeaderFieldsNot(Some(part), fields)
                }
                Some(SectionText::MsgText(MsgText::Text)) => Section::Text(Some(part)),
            };

            Ok((remaining, section))
        },
        map(section_msgtext, |text| match text {
            MsgText::Header => Section::Header(None),
            MsgText::HeaderFields(fields) => Section::HeaderFields(None, fields),
            MsgText::HeaderFieldsNot(fields) => Section::HeaderFieldsNot(None, fields),
            MsgText::Text => Section::Text(None),
        }),
    ))(input)
}

enum SectionText {
    MsgText(MsgText),
    Mime,
}

/// `section-text = section-msgtext / "MIME"`
fn section_text(input: &[u8]) -> WireResult<SectionText> {
    alt((
        map(section_msgtext, SectionText::MsgText),
        map(tag_no_case(b"MIME"), |_| SectionText::Mime),
    ))(input)
}

/// `section-binary = "[" [section-part] "]"` (RFC 3516)
pub(crate) fn section_binary(input: &[u8]) -> WireResult<Vec<NonZeroU32>> {
    delimited(
        tag(b"["),
        separated_list0(tag(b"."), nz_number),
        tag(b"]"),
    )(input)
}

/// `partial = "<" number "." nz-number ">"`
fn partial(input: &[u8]) -> WireResult<Partial> {
    map(
        delimited(
            tag(b"<"),
            tuple((number, tag(b"."), nz_number)),
            tag(b">"),
        ),
        |(offset, _, length)| (offset, length),
    )(input)
}

/// The `<origin>` suffix of a FETCH response body section.
pub(crate) fn origin(input: &[u8]) -> WireResult<u32> {
    delimited(tag(b"<"), number, tag(b">"))(input)
}

// ----- command side -------------------------------------------------------

/// `fetch-att`
pub(crate) fn fetch_att(input: &[u8]) -> WireResult<MessageDataItemName> {
    alt((
        map(tag_no_case(b"ENVELOPE"), |_| MessageDataItemName::Envelope),
        map(tag_no_case(b"FLAGS"), |_| MessageDataItemName::Flags),
        map(tag_no_case(b"INTERNALDATE"), |_| {
            MessageDataItemName::InternalDate
        }),
        map(tag_no_case(b"RFC822.HEADER"), |_| {
            MessageDataItemName::Rfc822Header
        }),
        map(tag_no_case(b"RFC822.SIZE"), |_| {
            MessageDataItemName::Rfc822Size
        }),
        map(tag_no_case(b"RFC822.TEXT"), |_| {
            MessageDataItemName::Rfc822Text
        }),
        map(tag_no_case(b"RFC822"), |_| MessageDataItemName::Rfc822),
        map(tag_no_case(b"BODYSTRUCTURE"), |_| {
            MessageDataItemName::BodyStructure
        }),
        map(
            tuple((
                tag_no_case(b"BODY"),
                map(opt(tag_no_case(b".PEEK")), |peek| peek.is_some()),
                section,
                opt(partial),
            )),
            |(_, peek, section, partial)| MessageDataItemName::BodyExt {
                section,
                partial,
                peek,
            },
        ),
        map(tag_no_case(b"BODY"), |_| MessageDataItemName::Body),
        map(
            preceded(tag_no_case(b"BINARY.SIZE"), section_binary),
            |section| MessageDataItemName::BinarySize { section },
        ),
        map(
            tuple((
                tag_no_case(b"BINARY"),
                map(opt(tag_no_case(b".PEEK")), |peek| peek.is_some()),
                section_binary,
                opt(partial),
            )),
            |(_, peek, section, partial)| MessageDataItemName::Binary {
                section,
                partial,
                peek,
            },
        ),
        map(tag_no_case(b"UID"), |_| MessageDataItemName::Uid),
        map(tag_no_case(b"MODSEQ"), |_| MessageDataItemName::ModSeq),
    ))(input)
}

// ----- response side ------------------------------------------------------

/// `msg-att = "(" (msg-att-dynamic / msg-att-static) *(SP ..) ")"`
pub(crate) fn msg_att(input: &[u8]) -> WireResult<NonEmptyVec<MessageDataItem>> {
    map(
        delimited(tag(b"("), separated_list1(sp, msg_att_item), tag(b")")),
        NonEmptyVec::unvalidated,
    )(input)
}

pub(crate) fn msg_att_item(input: &[u8]) -> WireResult<MessageDataItem> {
    alt((
        map(
            preceded(keyword_sp("ENVELOPE"), envelope),
            MessageDataItem::Envelope,
        ),
        map(
            preceded(
                keyword_sp("FLAGS"),
                delimited(tag(b"("), separated_list0(sp, flag_fetch), tag(b")")),
            ),
            MessageDataItem::Flags,
        ),
        map(
            preceded(keyword_sp("INTERNALDATE"), date_time),
            MessageDataItem::InternalDate,
        ),
        map(
            preceded(keyword_sp("RFC822.HEADER"), nstring),
            MessageDataItem::Rfc822Header,
        ),
        map(
            preceded(keyword_sp("RFC822.SIZE"), number),
            MessageDataItem::Rfc822Size,
        ),
        map(
            preceded(keyword_sp("RFC822.TEXT"), nstring),
            MessageDataItem::Rfc822Text,
        ),
        map(
            preceded(keyword_sp("RFC822"), nstring),
            MessageDataItem::Rfc822,
        ),
        map(
            preceded(keyword_sp("BODYSTRUCTURE"), body),
            MessageDataItem::BodyStructure,
        ),
        map(
            tuple((
                tag_no_case(b"BODY"),
                section,
                opt(origin),
                sp,
                nstring,
            )),
            |(_, section, origin, _, data)| MessageDataItem::BodyExt {
                section,
                origin,
                data,
            },
        ),
        map(preceded(keyword_sp("BODY"), body), MessageDataItem::Body),
        map(
            preceded(keyword_sp("UID"), nz_number),
            MessageDataItem::Uid,
        ),
        map(
            tuple((
                preceded(tag_no_case(b"BINARY.SIZE"), section_binary),
                sp,
                number,
            )),
            |(section, _, size)| MessageDataItem::BinarySize { section, size },
        ),
        map(
            tuple((
                preceded(tag_no_case(b"BINARY"), section_binary),
                sp,
                nstring8,
            )),
            |(section, _, data)| MessageDataItem::Binary { section, data },
        ),
        map(
            delimited(
                tuple((tag_no_case(b"MODSEQ"), sp, tag(b"("))),
                number64,
                tag(b")"),
            ),
            MessageDataItem::ModSeq,
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_att() {
        let tests: &[(&[u8], MessageDataItemName)] = &[
            (b"ENVELOPE???", MessageDataItemName::Envelope),
            (b"FLAGS???", MessageDataItemName::Flags),
            (b"RFC822.SIZE???", MessageDataItemName::Rfc822Size),
            (b"RFC822???", MessageDataItemName::Rfc822),
            (b"BODYSTRUCTURE???", MessageDataItemName::BodyStructure),
            (b"BODY???", MessageDataItemName::Body),
            (
                b"BODY[]???",
                MessageDataItemName::BodyExt {
                    section: None,
                    partial: None,
                    peek: false,
                },
            ),
            (
                b"BODY.PEEK[TEXT]<42.1337>???",
                MessageDataItemName::BodyExt {
                    section: Some(Section::Text(None)),
                    partial: Some((42, NonZeroU32::new(1337).unwrap())),
                    peek: true,
                },
            ),
            (
                b"BINARY[1.2]???",
                MessageDataItemName::Binary {
                    section: vec![NonZeroU32::new(1).unwrap(), NonZeroU32::new(2).unwrap()],
                    partial: None,
                    peek: false,
                },
            ),
            (
                b"BINARY.SIZE[3]???",
                MessageDataItemName::BinarySize {
                    section: vec![NonZeroU32::new(3).unwrap()],
                },
            ),
            (b"MODSEQ???", MessageDataItemName::ModSeq),
        ];

        for (input, expected) in tests {
            let (remaining, got) = fetch_att(input).unwrap();
            assert_eq!(&got, expected);
            assert_eq!(remaining, b"???");
        }
    }

    #[test]
    fn test_section_with_part_and_text() {
        let (_, value) = section(b"[1.2.HEADER]?").unwrap();
        match value {
            Some(Section::Header(Some(part))) => {
                assert_eq!(part.0.len(), 2)
            }
            other => panic!("unexpected: {other:?}"),
        }

        let (_, value) = section(b"[4.1.MIME]?").unwrap();
        assert!(matches!(value, Some(Section::Mime(_))));

        let (_, value) = section(b"[HEADER.FIELDS (Subject Date)]?").unwrap();
        match value {
            Some(Section::HeaderFields(None, fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }

        let (_, value) = section(b"[]?").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_msg_att_modseq() {
        let (_, value) = msg_att_item(b"MODSEQ (624140003)?").unwrap();
        assert_eq!(value, MessageDataItem::ModSeq(624140003));
    }

    #[test]
    fn test_msg_att_body_section() {
        let (_, value) = msg_att_item(b"BODY[] {5}\r\nhello)").unwrap();
        assert_eq!(
            value,
            MessageDataItem::BodyExt {
                section: None,
                origin: None,
                data: crate::core::NString::from("hello"),
            }
        );
    }
}
