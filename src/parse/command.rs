//! Command parsing.

use std::str::from_utf8;

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while1},
    combinator::{map, opt, value},
    error::ErrorKind,
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::{
    core::{NonEmptyVec, Secret},
    parse::{
        core::{
            astring, atom, base64, crlf, keyword_sp, literal, literal8, nil, nstring, sp, string,
            tag_imap,
        },
        datetime::date_time,
        fetch::fetch_att,
        flag::{flag, flag_list},
        mailbox::{list_mailbox, mailbox},
        metadata::{entries, entry_values, getmetadata_option},
        search::search_args,
        sequence::sequence_set,
        WireErrorKind, WireParseError, WireResult,
    },
    types::{
        auth::{AuthMechanism, AuthenticateData},
        capability::Capability,
        command::{
            AppendMessage, Command, CommandBody, FetchModifier, IdleDone, ListReturnOption,
            ListSelectionOption, SelectParameter, StoreModifier,
        },
        fetch::macros,
        flag::{StoreResponse, StoreType},
        id::IdParameters,
        sequence::SequenceSet,
        urlauth::{UrlMechanism, UrlRump},
        TaggedExtValue, TaggedExtension,
    },
    utils::indicators::is_astring_char,
};

/// `command = tag SP (command-any / command-auth / command-nonauth /
///            command-select) CRLF`
pub(crate) fn command(input: &[u8]) -> WireResult<Command> {
    let (remaining, tag) = terminated(tag_imap, sp)(input)?;

    let (remaining, body) = terminated(
        alt((command_any, command_auth, command_nonauth, command_select)),
        crlf,
    )(remaining)?;

    Ok((remaining, Command { tag, body }))
}

/// `command-any = "CAPABILITY" / "LOGOUT" / "NOOP" / id`
fn command_any(input: &[u8]) -> WireResult<CommandBody> {
    alt((
        value(CommandBody::Capability, tag_no_case(b"CAPABILITY")),
        value(CommandBody::Logout, tag_no_case(b"LOGOUT")),
        value(CommandBody::Noop, tag_no_case(b"NOOP")),
        id,
    ))(input)
}

/// `command-nonauth = login / authenticate / "STARTTLS"`
fn command_nonauth(input: &[u8]) -> WireResult<CommandBody> {
    alt((
        login,
        authenticate,
        value(CommandBody::StartTls, tag_no_case(b"STARTTLS")),
    ))(input)
}

/// The commands valid in the authenticated (or selected) state.
fn command_auth(input: &[u8]) -> WireResult<CommandBody> {
    alt((
        append,
        create,
        delete,
        examine,
        list,
        lsub,
        rename,
        select,
        status,
        subscribe,
        unsubscribe,
        value(CommandBody::Idle, tag_no_case(b"IDLE")),
        value(CommandBody::Namespace, tag_no_case(b"NAMESPACE")),
        enable,
        getmetadata,
        setmetadata,
        urlfetch,
        genurlauth,
        resetkey,
    ))(input)
}

/// The commands valid in the selected state.
fn command_select(input: &[u8]) -> WireResult<CommandBody> {
    alt((
        value(CommandBody::Check, tag_no_case(b"CHECK")),
        value(CommandBody::Close, tag_no_case(b"CLOSE")),
        value(CommandBody::Expunge, tag_no_case(b"EXPUNGE")),
        copy,
        fetch,
        store,
        uid,
        search,
        r#move,
    ))(input)
}

// ----- tagged extensions --------------------------------------------------

/// `tagged-ext = tagged-ext-label [SP tagged-ext-val]`
pub(crate) fn tagged_ext(input: &[u8]) -> WireResult<TaggedExtension> {
    map(
        tuple((atom, opt(preceded(sp, tagged_ext_val)))),
        |(label, value)| TaggedExtension { label, value },
    )(input)
}

/// Nesting budget for compound tagged-ext values.
const TAGGED_EXT_MAX_DEPTH: usize = 16;

/// `tagged-ext-val = tagged-ext-simple / "(" [tagged-ext-comp] ")"`
pub(crate) fn tagged_ext_val(input: &[u8]) -> WireResult<TaggedExtValue> {
    tagged_ext_val_limited(input, TAGGED_EXT_MAX_DEPTH)
}

fn tagged_ext_val_limited(input: &[u8], depth: usize) -> WireResult<TaggedExtValue> {
    if depth == 0 {
        return Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::TooDeep,
        }));
    }

    alt((
        tagged_ext_simple,
        map(
            delimited(
                tag(b"("),
                separated_list0(sp, move |input| tagged_ext_val_limited(input, depth - 1)),
                tag(b")"),
            ),
            TaggedExtValue::List,
        ),
    ))(input)
}

/// A simple tagged-ext value: a number, a sequence set, or an astring.
///
/// A bare token is classified after lexing: all digits is a (64-bit)
/// number, digits with `:`/`,`/`*` is a sequence set, anything else an
/// astring. Each classification re-encodes to the same bytes, so the
/// choice cannot break roundtrips.
fn tagged_ext_simple(input: &[u8]) -> WireResult<TaggedExtValue> {
    let (remaining, token) = match take_while1::<_, _, WireParseError>(is_astring_char)(input) {
        Ok(parsed) => parsed,
        Err(error @ nom::Err::Incomplete(_)) => return Err(error),
        // The first byte is no bare token; try quoted and literal strings.
        Err(_) => return map(string, TaggedExtValue::String)(input),
    };

    if token.iter().all(u8::is_ascii_digit) {
        // Token bytes are ASCII digits.
        return match from_utf8(token).unwrap().parse::<u64>() {
            Ok(number) => Ok((remaining, TaggedExtValue::Number(number))),
            Err(_) => Err(nom::Err::Failure(WireParseError {
                input,
                kind: WireErrorKind::BadNumber,
            })),
        };
    }

    if token
        .iter()
        .all(|b| b.is_ascii_digit() || matches!(b, b':' | b',' | b'*'))
    {
        if let Ok(set) = from_utf8(token).unwrap().parse::<SequenceSet>() {
            return Ok((remaining, TaggedExtValue::Sequence(set)));
        }
    }

    Ok((
        remaining,
        TaggedExtValue::String(crate::core::IString::from(token)),
    ))
}

// ----- non-authenticated --------------------------------------------------

/// `login = "LOGIN" SP userid SP password`
fn login(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("LOGIN"), astring, sp, astring)),
        |(_, username, _, password)| CommandBody::Login {
            username,
            password: Secret::new(password),
        },
    )(input)
}

/// `authenticate = "AUTHENTICATE" SP auth-type [SP (base64 / "=")]`
fn authenticate(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            keyword_sp("AUTHENTICATE"),
            auth_type,
            opt(preceded(
                sp,
                alt((
                    value(Vec::new(), tag(b"=")),
                    base64,
                )),
            )),
        )),
        |(_, mechanism, initial_response)| CommandBody::Authenticate {
            mechanism,
            initial_response: initial_response.map(Secret::new),
        },
    )(input)
}

/// `auth-type = atom`
pub(crate) fn auth_type(input: &[u8]) -> WireResult<AuthMechanism> {
    map(atom, AuthMechanism::from)(input)
}

/// `authenticate-data = base64 / "*"` (one full line)
pub(crate) fn authenticate_data(input: &[u8]) -> WireResult<AuthenticateData> {
    alt((
        value(AuthenticateData::Cancel, terminated(tag(b"*"), crlf)),
        map(terminated(base64, crlf), |data| {
            AuthenticateData::Continue(Secret::new(data))
        }),
    ))(input)
}

/// `idle-done = "DONE" CRLF`
pub(crate) fn idle_done(input: &[u8]) -> WireResult<IdleDone> {
    value(IdleDone, terminated(tag_no_case(b"DONE"), crlf))(input)
}

// ----- mailbox management -------------------------------------------------

fn select(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("SELECT"), mailbox, select_parameters)),
        |(_, mailbox, parameters)| CommandBody::Select {
            mailbox,
            parameters,
        },
    )(input)
}

fn examine(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("EXAMINE"), mailbox, select_parameters)),
        |(_, mailbox, parameters)| CommandBody::Examine {
            mailbox,
            parameters,
        },
    )(input)
}

/// `select-params = SP "(" select-param *(SP select-param) ")"` (RFC 4466)
fn select_parameters(input: &[u8]) -> WireResult<Vec<SelectParameter>> {
    map(
        opt(preceded(
            sp,
            delimited(
                tag(b"("),
                separated_list1(sp, select_parameter),
                tag(b")"),
            ),
        )),
        Option::unwrap_or_default,
    )(input)
}

fn select_parameter(input: &[u8]) -> WireResult<SelectParameter> {
    map(tagged_ext, |ext| {
        if ext.value.is_none() && ext.label.inner().eq_ignore_ascii_case("CONDSTORE") {
            SelectParameter::CondStore
        } else {
            SelectParameter::Other(ext)
        }
    })(input)
}

fn create(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("CREATE"), mailbox, create_parameters)),
        |(_, mailbox, parameters)| CommandBody::Create {
            mailbox,
            parameters,
        },
    )(input)
}

/// `create-params = SP "(" create-param *(SP create-param) ")"` (RFC 4466)
fn create_parameters(input: &[u8]) -> WireResult<Vec<TaggedExtension>> {
    map(
        opt(preceded(
            sp,
            delimited(tag(b"("), separated_list1(sp, tagged_ext), tag(b")")),
        )),
        Option::unwrap_or_default,
    )(input)
}

fn delete(input: &[u8]) -> WireResult<CommandBody> {
    map(preceded(keyword_sp("DELETE"), mailbox), |mailbox| {
        CommandBody::Delete { mailbox }
    })(input)
}

fn rename(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("RENAME"), mailbox, sp, mailbox, create_parameters)),
        |(_, from, _, to, parameters)| CommandBody::Rename {
            from,
            to,
            parameters,
        },
    )(input)
}

fn subscribe(input: &[u8]) -> WireResult<CommandBody> {
    map(preceded(keyword_sp("SUBSCRIBE"), mailbox), |mailbox| {
        CommandBody::Subscribe { mailbox }
    })(input)
}

fn unsubscribe(input: &[u8]) -> WireResult<CommandBody> {
    map(preceded(keyword_sp("UNSUBSCRIBE"), mailbox), |mailbox| {
        CommandBody::Unsubscribe { mailbox }
    })(input)
}

/// `list = "LIST" [SP list-select-opts] SP mailbox SP mbox-or-pat
///         [SP list-return-opts]` (RFC 3501 + RFC 5258)
fn list(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            tag_no_case(b"LIST"),
            map(
                opt(preceded(
                    sp,
                    delimited(
                        tag(b"("),
                        separated_list0(sp, list_select_opt),
                        tag(b")"),
                    ),
                )),
                Option::unwrap_or_default,
            ),
            sp,
            mailbox,
            sp,
            alt((
                map(
                    delimited(tag(b"("), separated_list1(sp, list_mailbox), tag(b")")),
                    NonEmptyVec::unvalidated,
                ),
                map(list_mailbox, NonEmptyVec::new),
            )),
            map(
                opt(preceded(
                    tuple((sp, tag_no_case(b"RETURN"), sp)),
                    delimited(
                        tag(b"("),
                        separated_list0(sp, list_return_opt),
                        tag(b")"),
                    ),
                )),
                Option::unwrap_or_default,
            ),
        )),
        |(_, selection_options, _, reference, _, patterns, return_options)| CommandBody::List {
            selection_options,
            reference,
            patterns,
            return_options,
        },
    )(input)
}

fn list_select_opt(input: &[u8]) -> WireResult<ListSelectionOption> {
    map(tagged_ext, |ext| {
        if ext.value.is_some() {
            return ListSelectionOption::Other(ext);
        }

        match ext.label.inner().to_ascii_uppercase().as_str() {
            "SUBSCRIBED" => ListSelectionOption::Subscribed,
            "REMOTE" => ListSelectionOption::Remote,
            "RECURSIVEMATCH" => ListSelectionOption::RecursiveMatch,
            _ => ListSelectionOption::Other(ext),
        }
    })(input)
}

fn list_return_opt(input: &[u8]) -> WireResult<ListReturnOption> {
    map(tagged_ext, |ext| {
        if ext.value.is_some() {
            return ListReturnOption::Other(ext);
        }

        match ext.label.inner().to_ascii_uppercase().as_str() {
            "SUBSCRIBED" => ListReturnOption::Subscribed,
            "CHILDREN" => ListReturnOption::Children,
            _ => ListReturnOption::Other(ext),
        }
    })(input)
}

fn lsub(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("LSUB"), mailbox, sp, list_mailbox)),
        |(_, reference, _, pattern)| CommandBody::Lsub { reference, pattern },
    )(input)
}

fn status(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            keyword_sp("STATUS"),
            mailbox,
            sp,
            delimited(
                tag(b"("),
                separated_list0(sp, crate::parse::status::status_att),
                tag(b")"),
            ),
        )),
        |(_, mailbox, _, item_names)| CommandBody::Status {
            mailbox,
            item_names,
        },
    )(input)
}

/// `append = "APPEND" SP mailbox 1*append-message` (RFC 3501 + RFC 3502)
fn append(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("APPEND"), mailbox, many1(append_message))),
        |(_, mailbox, messages)| CommandBody::Append {
            mailbox,
            messages: NonEmptyVec::unvalidated(messages),
        },
    )(input)
}

/// `append-message = [SP flag-list] [SP date-time] SP (literal / literal8)`
fn append_message(input: &[u8]) -> WireResult<AppendMessage> {
    map(
        tuple((
            opt(preceded(sp, flag_list)),
            opt(preceded(sp, date_time)),
            sp,
            alt((literal, literal8)),
        )),
        |(flags, date, _, data)| AppendMessage {
            flags: flags.unwrap_or_default(),
            date,
            data: data.into_bytes(),
        },
    )(input)
}

// ----- extensions in the authenticated state ------------------------------

/// `enable = "ENABLE" 1*(SP capability)` (RFC 5161)
fn enable(input: &[u8]) -> WireResult<CommandBody> {
    map(
        preceded(
            tag_no_case(b"ENABLE"),
            many1(preceded(sp, map(atom, Capability::from))),
        ),
        |capabilities| CommandBody::Enable {
            capabilities: NonEmptyVec::unvalidated(capabilities),
        },
    )(input)
}

/// `id = "ID" SP id-params-list` (RFC 2971)
fn id(input: &[u8]) -> WireResult<CommandBody> {
    map(preceded(keyword_sp("ID"), id_params_list), |parameters| {
        CommandBody::Id { parameters }
    })(input)
}

/// `id-params-list = "(" [string SP nstring *(SP string SP nstring)] ")" / nil`
pub(crate) fn id_params_list(input: &[u8]) -> WireResult<IdParameters> {
    let (remaining, pairs) = alt((
        map(nil, |_| Vec::new()),
        delimited(
            tag(b"("),
            separated_list0(sp, map(tuple((string, sp, nstring)), |(k, _, v)| (k, v))),
            tag(b")"),
        ),
    ))(input)?;

    match IdParameters::try_from(pairs) {
        Ok(parameters) => Ok((remaining, parameters)),
        Err(_) => Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Verify),
        })),
    }
}

/// `getmetadata = "GETMETADATA" [SP getmetadata-options] SP mailbox SP entries`
fn getmetadata(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            tag_no_case(b"GETMETADATA"),
            map(
                opt(preceded(
                    sp,
                    delimited(
                        tag(b"("),
                        separated_list1(sp, getmetadata_option),
                        tag(b")"),
                    ),
                )),
                Option::unwrap_or_default,
            ),
            sp,
            mailbox,
            sp,
            entries,
        )),
        |(_, options, _, mailbox, _, entries)| CommandBody::GetMetadata {
            options,
            mailbox,
            entries,
        },
    )(input)
}

/// `setmetadata = "SETMETADATA" SP mailbox SP entry-values`
fn setmetadata(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("SETMETADATA"), mailbox, sp, entry_values)),
        |(_, mailbox, _, entries)| CommandBody::SetMetadata { mailbox, entries },
    )(input)
}

/// `urlfetch = "URLFETCH" 1*(SP url)` (RFC 4467)
fn urlfetch(input: &[u8]) -> WireResult<CommandBody> {
    map(
        preceded(tag_no_case(b"URLFETCH"), many1(preceded(sp, astring))),
        |urls| CommandBody::UrlFetch {
            urls: NonEmptyVec::unvalidated(urls),
        },
    )(input)
}

/// `genurlauth = "GENURLAUTH" 1*(SP url-rump SP mechanism)` (RFC 4467)
fn genurlauth(input: &[u8]) -> WireResult<CommandBody> {
    map(
        preceded(
            tag_no_case(b"GENURLAUTH"),
            many1(preceded(
                sp,
                map(
                    tuple((astring, sp, map(atom, UrlMechanism::from))),
                    |(url, _, mechanism)| UrlRump { url, mechanism },
                ),
            )),
        ),
        |rumps| CommandBody::GenUrlAuth {
            rumps: NonEmptyVec::unvalidated(rumps),
        },
    )(input)
}

/// `resetkey = "RESETKEY" [SP mailbox *(SP mechanism)]` (RFC 4467)
fn resetkey(input: &[u8]) -> WireResult<CommandBody> {
    map(
        preceded(
            tag_no_case(b"RESETKEY"),
            opt(tuple((
                preceded(sp, mailbox),
                many0(preceded(sp, map(atom, UrlMechanism::from))),
            ))),
        ),
        |mailbox| CommandBody::ResetKey { mailbox },
    )(input)
}

// ----- selected state -----------------------------------------------------

fn copy(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("COPY"), sequence_set, sp, mailbox)),
        |(_, sequence_set, _, mailbox)| CommandBody::Copy {
            sequence_set,
            mailbox,
            uid: false,
        },
    )(input)
}

fn r#move(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((keyword_sp("MOVE"), sequence_set, sp, mailbox)),
        |(_, sequence_set, _, mailbox)| CommandBody::Move {
            sequence_set,
            mailbox,
            uid: false,
        },
    )(input)
}

/// `search = "SEARCH" [search-return-opts] [SP "CHARSET" SP charset]
///           1*(SP search-key)`
fn search(input: &[u8]) -> WireResult<CommandBody> {
    map(
        preceded(tag_no_case(b"SEARCH"), search_args),
        |(return_options, charset, criteria)| CommandBody::Search {
            return_options,
            charset,
            criteria,
            uid: false,
        },
    )(input)
}

/// `fetch = "FETCH" SP sequence-set SP ("ALL" / "FULL" / "FAST" / fetch-att /
///          "(" fetch-att *(SP fetch-att) ")") [fetch-modifiers]`
fn fetch(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            keyword_sp("FETCH"),
            sequence_set,
            sp,
            alt((
                // Macros expand to their canonical item lists.
                value(macros::ALL.to_vec(), tag_no_case(b"ALL")),
                value(macros::FULL.to_vec(), tag_no_case(b"FULL")),
                value(macros::FAST.to_vec(), tag_no_case(b"FAST")),
                delimited(tag(b"("), separated_list0(sp, fetch_att), tag(b")")),
                map(fetch_att, |item| vec![item]),
            )),
            map(
                opt(preceded(
                    sp,
                    delimited(
                        tag(b"("),
                        separated_list1(sp, fetch_modifier),
                        tag(b")"),
                    ),
                )),
                Option::unwrap_or_default,
            ),
        )),
        |(_, sequence_set, _, items, modifiers)| CommandBody::Fetch {
            sequence_set,
            items,
            modifiers,
            uid: false,
        },
    )(input)
}

fn fetch_modifier(input: &[u8]) -> WireResult<FetchModifier> {
    map(tagged_ext, |ext| {
        if ext.label.inner().eq_ignore_ascii_case("CHANGEDSINCE") {
            if let Some(TaggedExtValue::Number(value)) = ext.value {
                return FetchModifier::ChangedSince(value);
            }
        }

        FetchModifier::Other(ext)
    })(input)
}

/// `store = "STORE" SP sequence-set [store-modifiers] SP store-att-flags`
fn store(input: &[u8]) -> WireResult<CommandBody> {
    map(
        tuple((
            keyword_sp("STORE"),
            sequence_set,
            map(
                opt(preceded(
                    sp,
                    delimited(
                        tag(b"("),
                        separated_list1(sp, store_modifier),
                        tag(b")"),
                    ),
                )),
                Option::unwrap_or_default,
            ),
            sp,
            store_att_flags,
        )),
        |(_, sequence_set, modifiers, _, (kind, response, flags))| CommandBody::Store {
            sequence_set,
            kind,
            response,
            flags,
            modifiers,
            uid: false,
        },
    )(input)
}

fn store_modifier(input: &[u8]) -> WireResult<StoreModifier> {
    map(tagged_ext, |ext| {
        if ext.label.inner().eq_ignore_ascii_case("UNCHANGEDSINCE") {
            if let Some(TaggedExtValue::Number(value)) = ext.value {
                return StoreModifier::UnchangedSince(value);
            }
        }

        StoreModifier::Other(ext)
    })(input)
}

/// `store-att-flags = (["+" / "-"] "FLAGS" [".SILENT"]) SP
///                    (flag-list / (flag *(SP flag)))`
fn store_att_flags(
    input: &[u8],
) -> WireResult<(StoreType, StoreResponse, Vec<crate::types::flag::Flag>)> {
    map(
        tuple((
            map(
                opt(alt((
                    value(StoreType::Add, tag(b"+")),
                    value(StoreType::Remove, tag(b"-")),
                ))),
                |kind| kind.unwrap_or(StoreType::Replace),
            ),
            tag_no_case(b"FLAGS"),
            map(opt(tag_no_case(b".SILENT")), |silent| {
                if silent.is_some() {
                    StoreResponse::Silent
                } else {
                    StoreResponse::Answer
                }
            }),
            sp,
            alt((flag_list, separated_list1(sp, flag))),
        )),
        |(kind, _, response, _, flags)| (kind, response, flags),
    )(input)
}

/// `uid = "UID" SP (copy / move / fetch / search / store)`
fn uid(input: &[u8]) -> WireResult<CommandBody> {
    let (remaining, mut body) = preceded(
        keyword_sp("UID"),
        alt((copy, r#move, fetch, search, store)),
    )(input)?;

    match body {
        CommandBody::Copy { ref mut uid, .. }
        | CommandBody::Move { ref mut uid, .. }
        | CommandBody::Fetch { ref mut uid, .. }
        | CommandBody::Search { ref mut uid, .. }
        | CommandBody::Store { ref mut uid, .. } => *uid = true,
        _ => unreachable!(),
    }

    Ok((remaining, body))
}
