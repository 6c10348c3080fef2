//! Response parsing.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_until, take_while},
    combinator::{map, map_res, opt, value},
    error::ErrorKind,
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::{
    core::{NonEmptyVec, Tag},
    parse::{
        command::{id_params_list, tagged_ext_val},
        core::{
            astring, atom, charset, crlf, keyword_sp, nstring, number, number64, nz_number,
            quoted_char, sp, string, tag_imap, text,
        },
        fetch::msg_att,
        flag::{flag, flag_name_attribute, flag_perm},
        mailbox::mailbox,
        metadata::metadata_response,
        search::search_return_data,
        sequence::sequence_set,
        WireErrorKind, WireParseError, WireResult,
    },
    types::{
        capability::Capability,
        namespace::{NamespaceClass, NamespaceDescription, NamespaceExtension},
        response::{Code, Continue, Data, Greeting, GreetingKind, Response, Status},
        search::ExtendedSearchData,
        urlauth::UrlFetchItem,
    },
};

/// `greeting = "*" SP (resp-cond-auth / resp-cond-bye) CRLF`
pub(crate) fn greeting(input: &[u8]) -> WireResult<Greeting> {
    let (remaining, (_, kind, _, (code, text), _)) = tuple((
        tag(b"* "),
        alt((
            value(GreetingKind::PreAuth, tag_no_case(b"PREAUTH")),
            value(GreetingKind::Ok, tag_no_case(b"OK")),
            value(GreetingKind::Bye, tag_no_case(b"BYE")),
        )),
        sp,
        resp_text,
        crlf,
    ))(input)?;

    Ok((remaining, Greeting { kind, code, text }))
}

/// `response = continue-req / response-data / response-tagged`
pub(crate) fn response(input: &[u8]) -> WireResult<Response> {
    alt((
        map(continue_req, Response::Continue),
        response_data,
        map(response_tagged, Response::Status),
    ))(input)
}

/// `continue-req = "+" SP (resp-text / base64) CRLF`
pub(crate) fn continue_req(input: &[u8]) -> WireResult<Continue> {
    // Trying base64 on the whole line first avoids committing to a `Text`
    // that happens to be valid base64.
    preceded(
        tag(b"+ "),
        alt((
            map(
                terminated(
                    map_res(take_until("\r\n"), |line| base64_engine.decode(line)),
                    crlf,
                ),
                Continue::Base64,
            ),
            map(terminated(resp_text, crlf), |(code, text)| {
                Continue::Basic { code, text }
            }),
        )),
    )(input)
}

/// `response-tagged = tag SP resp-cond-state CRLF`
fn response_tagged(input: &[u8]) -> WireResult<Status> {
    let (remaining, (tag, _, (kind, code, text), _)) =
        tuple((tag_imap, sp, resp_cond_state, crlf))(input)?;

    let status = match kind {
        StateKind::Ok => Status::Ok {
            tag: Some(tag),
            code,
            text,
        },
        StateKind::No => Status::No {
            tag: Some(tag),
            code,
            text,
        },
        StateKind::Bad => Status::Bad {
            tag: Some(tag),
            code,
            text,
        },
    };

    Ok((remaining, status))
}

#[derive(Clone, Copy)]
enum StateKind {
    Ok,
    No,
    Bad,
}

/// `resp-cond-state = ("OK" / "NO" / "BAD") SP resp-text`
fn resp_cond_state(input: &[u8]) -> WireResult<(StateKind, Option<Code>, crate::core::Text)> {
    let (remaining, (kind, _, (code, text))) = tuple((
        alt((
            value(StateKind::Ok, tag_no_case(b"OK")),
            value(StateKind::No, tag_no_case(b"NO")),
            value(StateKind::Bad, tag_no_case(b"BAD")),
        )),
        sp,
        resp_text,
    ))(input)?;

    Ok((remaining, (kind, code, text)))
}

/// `response-data = "*" SP (resp-cond-state / resp-cond-bye / mailbox-data /
///                  message-data / capability-data / ...) CRLF`
fn response_data(input: &[u8]) -> WireResult<Response> {
    delimited(
        tag(b"* "),
        alt((
            map(resp_cond_state, |(kind, code, text)| {
                Response::Status(match kind {
                    StateKind::Ok => Status::Ok {
                        tag: None,
                        code,
                        text,
                    },
                    StateKind::No => Status::No {
                        tag: None,
                        code,
                        text,
                    },
                    StateKind::Bad => Status::Bad {
                        tag: None,
                        code,
                        text,
                    },
                })
            }),
            map(
                preceded(keyword_sp("BYE"), resp_text),
                |(code, text)| Response::Status(Status::Bye { code, text }),
            ),
            map(flags_data, Response::Data),
            map(list_data, Response::Data),
            map(lsub_data, Response::Data),
            map(status_data, Response::Data),
            map(esearch_data, Response::Data),
            map(search_data, Response::Data),
            map(map(capability_data, Data::Capability), Response::Data),
            map(enabled_data, Response::Data),
            map(id_data, Response::Data),
            map(namespace_data, Response::Data),
            map(metadata_data, Response::Data),
            map(genurlauth_data, Response::Data),
            map(urlfetch_data, Response::Data),
            map(numeric_data, Response::Data),
        )),
        crlf,
    )(input)
}

// ----- resp-text and codes ------------------------------------------------

/// `resp-text = ["[" resp-text-code "]" SP] text`
pub(crate) fn resp_text(input: &[u8]) -> WireResult<(Option<Code>, crate::core::Text)> {
    // Once the text starts with "[", a code must parse; otherwise broken
    // codes would silently become text.
    let (_, bracket) = opt(tag(b"["))(input)?;

    if bracket.is_some() {
        tuple((
            map(
                delimited(
                    tag(b"["),
                    alt((resp_text_code_known, resp_text_code_other)),
                    tag(b"]"),
                ),
                Some,
            ),
            preceded(sp, text),
        ))(input)
    } else {
        map(text, |text| (None, text))(input)
    }
}

/// The `resp-text-code` alternatives this crate models explicitly.
fn resp_text_code_known(input: &[u8]) -> WireResult<Code> {
    terminated(
        alt((
            value(Code::Alert, tag_no_case(b"ALERT")),
            map(
                preceded(
                    tag_no_case(b"BADCHARSET"),
                    opt(delimited(
                        tag(b" ("),
                        separated_list1(sp, charset),
                        tag(b")"),
                    )),
                ),
                |allowed| Code::BadCharset {
                    allowed: allowed.unwrap_or_default(),
                },
            ),
            map(capability_data, Code::Capability),
            value(Code::Parse, tag_no_case(b"PARSE")),
            map(
                preceded(
                    keyword_sp("PERMANENTFLAGS"),
                    delimited(
                        tag(b"("),
                        separated_list0(sp, flag_perm),
                        tag(b")"),
                    ),
                ),
                Code::PermanentFlags,
            ),
            value(Code::ReadOnly, tag_no_case(b"READ-ONLY")),
            value(Code::ReadWrite, tag_no_case(b"READ-WRITE")),
            value(Code::TryCreate, tag_no_case(b"TRYCREATE")),
            map(preceded(keyword_sp("UIDNEXT"), nz_number), Code::UidNext),
            map(
                preceded(keyword_sp("UIDVALIDITY"), nz_number),
                Code::UidValidity,
            ),
            map(preceded(keyword_sp("UNSEEN"), nz_number), Code::Unseen),
            map(
                preceded(keyword_sp("HIGHESTMODSEQ"), number64),
                Code::HighestModSeq,
            ),
            value(Code::NoModSeq, tag_no_case(b"NOMODSEQ")),
            map(
                preceded(keyword_sp("MODIFIED"), sequence_set),
                Code::Modified,
            ),
        )),
        // The code must extend to the closing bracket, which stays unconsumed.
        nom::combinator::peek(tag(b"]")),
    )(input)
}

/// `resp-text-code` fallback: `atom [SP <anything except "]">]`, verbatim.
fn resp_text_code_other(input: &[u8]) -> WireResult<Code> {
    map(
        tuple((
            atom,
            opt(preceded(
                sp,
                take_while(|b: u8| b != b']' && b != b'\r' && b != b'\n'),
            )),
        )),
        |(atom, arguments)| Code::Other {
            atom,
            arguments: arguments.map(<[u8]>::to_vec),
        },
    )(input)
}

// ----- untagged data ------------------------------------------------------

/// `capability-data = "CAPABILITY" *(SP capability) SP "IMAP4rev1"
///                    *(SP capability)` (relaxed to one-or-more)
pub(crate) fn capability_data(input: &[u8]) -> WireResult<NonEmptyVec<Capability>> {
    map(
        preceded(
            tag_no_case(b"CAPABILITY"),
            many1(preceded(sp, map(atom, Capability::from))),
        ),
        NonEmptyVec::unvalidated,
    )(input)
}

/// `"FLAGS" SP flag-list`
fn flags_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(
            keyword_sp("FLAGS"),
            delimited(tag(b"("), separated_list0(sp, flag), tag(b")")),
        ),
        Data::Flags,
    )(input)
}

/// `mailbox-list = "(" [mbx-list-flags] ")" SP
///                 (DQUOTE QUOTED-CHAR DQUOTE / nil) SP mailbox
///                 [SP mbox-list-extended]`
#[allow(clippy::type_complexity)]
fn mailbox_list(
    input: &[u8],
) -> WireResult<(
    Vec<crate::types::flag::FlagNameAttribute>,
    Option<crate::core::QuotedChar>,
    crate::types::mailbox::Mailbox,
    Vec<(crate::core::IString, crate::types::TaggedExtValue)>,
)> {
    let (remaining, (items, _, delimiter, _, mailbox, extensions)) = tuple((
        delimited(
            tag(b"("),
            separated_list0(sp, flag_name_attribute),
            tag(b")"),
        ),
        sp,
        alt((
            map(
                delimited(tag(b"\""), quoted_char, tag(b"\"")),
                Some,
            ),
            map(tag_no_case(b"NIL"), |_| None),
        )),
        sp,
        mailbox,
        map(
            opt(preceded(
                sp,
                delimited(
                    tag(b"("),
                    separated_list0(
                        sp,
                        map(tuple((astring, sp, tagged_ext_val)), |(label, _, value)| {
                            (label, value)
                        }),
                    ),
                    tag(b")"),
                ),
            )),
            Option::unwrap_or_default,
        ),
    ))(input)?;

    Ok((remaining, (items, delimiter, mailbox, extensions)))
}

/// `"LIST" SP mailbox-list`
fn list_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(keyword_sp("LIST"), mailbox_list),
        |(items, delimiter, mailbox, extensions)| Data::List {
            items,
            delimiter,
            mailbox,
            extensions,
        },
    )(input)
}

/// `"LSUB" SP mailbox-list`
fn lsub_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(keyword_sp("LSUB"), mailbox_list),
        |(items, delimiter, mailbox, _)| Data::Lsub {
            items,
            delimiter,
            mailbox,
        },
    )(input)
}

/// `"STATUS" SP mailbox SP "(" [status-att-list] ")"`
fn status_data(input: &[u8]) -> WireResult<Data> {
    map(
        tuple((
            keyword_sp("STATUS"),
            mailbox,
            sp,
            delimited(
                tag(b"("),
                separated_list0(sp, crate::parse::status::status_att_val),
                tag(b")"),
            ),
        )),
        |(_, mailbox, _, items)| Data::Status { mailbox, items },
    )(input)
}

/// `mailbox-data =/ "SEARCH" *(SP nz-number) [SP "(" "MODSEQ" SP
///                 mod-sequence-value ")"]` (RFC 3501 + RFC 7162)
fn search_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(
            tag_no_case(b"SEARCH"),
            tuple((
                many0(preceded(sp, nz_number)),
                opt(preceded(
                    sp,
                    delimited(
                        tag(b"("),
                        preceded(keyword_sp("MODSEQ"), number64),
                        tag(b")"),
                    ),
                )),
            )),
        ),
        |(seqs, highest_modseq)| Data::Search {
            seqs,
            highest_modseq,
        },
    )(input)
}

/// `esearch-response = "ESEARCH" [search-correlator] [SP "UID"]
///                     *(SP search-return-data)` (RFC 4731)
fn esearch_data(input: &[u8]) -> WireResult<Data> {
    let (remaining, (_, correlator, uid, returns)) = tuple((
        tag_no_case(b"ESEARCH"),
        opt(preceded(
            tuple((sp, tag(b"("), tag_no_case(b"TAG"), sp)),
            terminated(tag_string, tag(b")")),
        )),
        map(opt(preceded(sp, tag_no_case(b"UID"))), |uid| uid.is_some()),
        many0(preceded(sp, search_return_data)),
    ))(input)?;

    Ok((
        remaining,
        Data::ExtendedSearch(ExtendedSearchData {
            correlator,
            uid,
            returns,
        }),
    ))
}

/// `tag-string = astring` holding a command tag.
fn tag_string(input: &[u8]) -> WireResult<Tag> {
    let (remaining, value) = astring(input)?;

    match Tag::try_from(value.as_bytes()) {
        Ok(tag) => Ok((remaining, tag)),
        Err(_) => Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Verify),
        })),
    }
}

/// `enable-data = "ENABLED" *(SP capability)` (RFC 5161)
fn enabled_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(
            tag_no_case(b"ENABLED"),
            many0(preceded(sp, map(atom, Capability::from))),
        ),
        |capabilities| Data::Enabled { capabilities },
    )(input)
}

/// `id-response = "ID" SP id-params-list` (RFC 2971)
fn id_data(input: &[u8]) -> WireResult<Data> {
    map(preceded(keyword_sp("ID"), id_params_list), |parameters| {
        Data::Id { parameters }
    })(input)
}

/// `namespace-response = "NAMESPACE" SP namespace SP namespace SP namespace`
fn namespace_data(input: &[u8]) -> WireResult<Data> {
    map(
        tuple((
            keyword_sp("NAMESPACE"),
            namespace_class,
            sp,
            namespace_class,
            sp,
            namespace_class,
        )),
        |(_, personal, _, other, _, shared)| Data::Namespace {
            personal,
            other,
            shared,
        },
    )(input)
}

/// `namespace = nil / "(" 1*namespace-descr ")"`
fn namespace_class(input: &[u8]) -> WireResult<NamespaceClass> {
    alt((
        map(tag_no_case(b"NIL"), |_| None),
        map(
            delimited(tag(b"("), many1(namespace_description), tag(b")")),
            |descriptions| Some(NonEmptyVec::unvalidated(descriptions)),
        ),
    ))(input)
}

/// `namespace-descr = "(" string SP (DQUOTE QUOTED-CHAR DQUOTE / nil)
///                    *(namespace-response-extension) ")"`
fn namespace_description(input: &[u8]) -> WireResult<NamespaceDescription> {
    let (remaining, (_, prefix, _, delimiter, extensions, _)) = tuple((
        tag(b"("),
        string,
        sp,
        alt((
            map(delimited(tag(b"\""), quoted_char, tag(b"\"")), Some),
            map(tag_no_case(b"NIL"), |_| None),
        )),
        many0(namespace_extension),
        tag(b")"),
    ))(input)?;

    Ok((
        remaining,
        NamespaceDescription {
            prefix,
            delimiter,
            extensions,
        },
    ))
}

/// `namespace-response-extension = SP string SP "(" string *(SP string) ")"`
fn namespace_extension(input: &[u8]) -> WireResult<NamespaceExtension> {
    let (remaining, (_, label, _, values)) = tuple((
        sp,
        string,
        sp,
        delimited(tag(b"("), separated_list1(sp, string), tag(b")")),
    ))(input)?;

    Ok((
        remaining,
        NamespaceExtension {
            label,
            values: NonEmptyVec::unvalidated(values),
        },
    ))
}

/// `metadata-resp = "METADATA" SP mailbox SP (entry-values / entry-list)`
fn metadata_data(input: &[u8]) -> WireResult<Data> {
    map(
        tuple((keyword_sp("METADATA"), mailbox, sp, metadata_response)),
        |(_, mailbox, _, items)| Data::Metadata { mailbox, items },
    )(input)
}

/// `"GENURLAUTH" 1*(SP url-full)` (RFC 4467)
fn genurlauth_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(tag_no_case(b"GENURLAUTH"), many1(preceded(sp, astring))),
        |urls| Data::GenUrlAuth(NonEmptyVec::unvalidated(urls)),
    )(input)
}

/// `"URLFETCH" 1*(SP url SP nstring)` (RFC 4467)
fn urlfetch_data(input: &[u8]) -> WireResult<Data> {
    map(
        preceded(
            tag_no_case(b"URLFETCH"),
            many1(preceded(
                sp,
                map(tuple((astring, sp, nstring)), |(url, _, data)| {
                    UrlFetchItem { url, data }
                }),
            )),
        ),
        |items| Data::UrlFetch(NonEmptyVec::unvalidated(items)),
    )(input)
}

/// `number SP ("EXISTS" / "RECENT" / "EXPUNGE" / "FETCH" SP msg-att)`
fn numeric_data(input: &[u8]) -> WireResult<Data> {
    let (remaining, (n, _, keyword)) = tuple((
        number,
        sp,
        nom::bytes::streaming::take_while1(crate::utils::indicators::is_atom_char),
    ))(input)?;

    let nz = || match NonZeroU32::new(n) {
        Some(nz) => Ok(nz),
        None => Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Verify),
        })),
    };

    match keyword.to_ascii_uppercase().as_slice() {
        b"EXISTS" => Ok((remaining, Data::Exists(n))),
        b"RECENT" => Ok((remaining, Data::Recent(n))),
        b"EXPUNGE" => Ok((remaining, Data::Expunge(nz()?))),
        b"FETCH" => {
            let (remaining, items) = preceded(sp, msg_att)(remaining)?;
            Ok((remaining, Data::Fetch { seq: nz()?, items }))
        }
        _ => Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Tag),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::NString,
        types::fetch::MessageDataItem,
        types::flag::FlagNameAttribute,
    };

    #[test]
    fn test_greeting() {
        let (_, value) = greeting(b"* OK IMAP4rev1 Service Ready\r\n").unwrap();
        assert_eq!(value.kind, GreetingKind::Ok);
        assert_eq!(value.text.inner(), "IMAP4rev1 Service Ready");

        assert!(matches!(
            greeting(b"* OK x\r"),
            Err(nom::Err::Incomplete(_))
        ));
    }

    #[test]
    fn test_tagged_ok_with_code() {
        let (_, value) = response(b"A1 OK [READ-WRITE] SELECT completed\r\n").unwrap();
        assert_eq!(
            value,
            Response::Status(Status::Ok {
                tag: Some(Tag::try_from("A1").unwrap()),
                code: Some(Code::ReadWrite),
                text: crate::core::Text::try_from("SELECT completed").unwrap(),
            })
        );
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let (_, value) = response(b"* OK [XWEIRD 1 2 x] hi\r\n").unwrap();
        match value {
            Response::Status(Status::Ok {
                code: Some(Code::Other { atom, arguments }),
                ..
            }) => {
                assert_eq!(atom.inner(), "XWEIRD");
                assert_eq!(arguments.as_deref(), Some(b"1 2 x".as_ref()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_untagged_data() {
        let (_, value) = response(b"* 23 EXISTS\r\n").unwrap();
        assert_eq!(value, Response::Data(Data::Exists(23)));

        let (_, value) = response(b"* 5 RECENT\r\n").unwrap();
        assert_eq!(value, Response::Data(Data::Recent(5)));

        let (_, value) = response(b"* 44 EXPUNGE\r\n").unwrap();
        assert_eq!(value, Response::Data(Data::expunge(44).unwrap()));

        let (_, value) = response(b"* SEARCH 2 3 6\r\n").unwrap();
        match value {
            Response::Data(Data::Search { seqs, .. }) => assert_eq!(seqs.len(), 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_search_with_modseq() {
        let (_, value) = response(b"* SEARCH 2 5 6 (MODSEQ 917162500)\r\n").unwrap();
        assert_eq!(
            value,
            Response::Data(Data::Search {
                seqs: vec![
                    NonZeroU32::new(2).unwrap(),
                    NonZeroU32::new(5).unwrap(),
                    NonZeroU32::new(6).unwrap(),
                ],
                highest_modseq: Some(917162500),
            })
        );
    }

    #[test]
    fn test_list_response() {
        let (_, value) = response(b"* LIST (\\Noselect) \"/\" \"\"\r\n").unwrap();
        match value {
            Response::Data(Data::List {
                items, delimiter, ..
            }) => {
                assert_eq!(items, vec![FlagNameAttribute::Noselect]);
                assert_eq!(
                    delimiter,
                    Some(crate::core::QuotedChar::try_from('/').unwrap())
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_with_literal() {
        let (_, value) = response(b"* 1 FETCH (RFC822 {5}\r\nhello)\r\n").unwrap();
        assert_eq!(
            value,
            Response::Data(Data::Fetch {
                seq: NonZeroU32::new(1).unwrap(),
                items: NonEmptyVec::new(MessageDataItem::Rfc822(NString::from("hello"))),
            })
        );
    }

    #[test]
    fn test_esearch() {
        let (_, value) =
            response(b"* ESEARCH (TAG \"A285\") UID MIN 2 COUNT 3\r\n").unwrap();
        match value {
            Response::Data(Data::ExtendedSearch(data)) => {
                assert_eq!(data.correlator, Some(Tag::try_from("A285").unwrap()));
                assert!(data.uid);
                assert_eq!(data.returns.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_continue_req() {
        let (_, value) = continue_req(b"+ idling\r\n").unwrap();
        assert_eq!(
            value,
            Continue::Basic {
                code: None,
                text: crate::core::Text::try_from("idling").unwrap(),
            }
        );

        let (_, value) = continue_req(b"+ VGVzdA==\r\n").unwrap();
        assert_eq!(value, Continue::Base64(b"Test".to_vec()));
    }

    #[test]
    fn test_namespace() {
        let input = b"* NAMESPACE ((\"\" \"/\")) NIL NIL\r\n";
        let (_, value) = response(input).unwrap();
        match value {
            Response::Data(Data::Namespace {
                personal,
                other,
                shared,
            }) => {
                assert_eq!(personal.unwrap().len(), 1);
                assert!(other.is_none());
                assert!(shared.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_metadata_responses() {
        let (_, value) =
            response(b"* METADATA \"INBOX\" (/shared/comment \"c\")\r\n").unwrap();
        assert!(matches!(
            value,
            Response::Data(Data::Metadata {
                items: crate::types::metadata::MetadataResponse::WithValues(_),
                ..
            })
        ));

        let (_, value) =
            response(b"* METADATA \"x\" /shared/comment /private/comment\r\n").unwrap();
        assert!(matches!(
            value,
            Response::Data(Data::Metadata {
                items: crate::types::metadata::MetadataResponse::WithoutValues(_),
                ..
            })
        ));
    }
}
