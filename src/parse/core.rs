//! Token-class parsers: numbers, atoms, strings, literals, tags.

use std::{num::NonZeroU32, str::from_utf8};

use abnf_core::{is_alpha, is_digit, streaming::dquote};
use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use nom::{
    branch::alt,
    bytes::streaming::{escaped, tag, tag_no_case, take, take_while, take_while1, take_while_m_n},
    character::streaming::{digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    error::ErrorKind,
    sequence::{terminated, tuple},
};

use crate::{
    core::{Atom, Charset, IString, NString, QuotedChar, Tag, Text},
    parse::{WireErrorKind, WireParseError, WireResult},
    utils::{
        indicators::{
            is_any_text_char_except_quoted_specials, is_astring_char, is_atom_char,
            is_quoted_specials, is_text_char,
        },
        unescape_quoted,
    },
};

// ----- numbers ------------------------------------------------------------

/// `number = 1*DIGIT` (unsigned 32-bit)
///
/// Overflow is a hard failure so that it surfaces as
/// [`DecodeError::IntegerOverflow`](crate::parse::DecodeError) instead of
/// being masked by backtracking.
pub(crate) fn number(input: &[u8]) -> WireResult<u32> {
    let (remaining, digits) = digit1(input)?;

    // `digit1` only matches ASCII digits.
    match from_utf8(digits).unwrap().parse::<u32>() {
        Ok(number) => Ok((remaining, number)),
        Err(_) => Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::BadNumber,
        })),
    }
}

/// `number64 = 1*DIGIT` (unsigned 64-bit, used for mod-sequences)
pub(crate) fn number64(input: &[u8]) -> WireResult<u64> {
    let (remaining, digits) = digit1(input)?;

    match from_utf8(digits).unwrap().parse::<u64>() {
        Ok(number) => Ok((remaining, number)),
        Err(_) => Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::BadNumber,
        })),
    }
}

/// `nz-number = digit-nz *DIGIT`
pub(crate) fn nz_number(input: &[u8]) -> WireResult<NonZeroU32> {
    let (remaining, value) = number(input)?;

    match NonZeroU32::new(value) {
        Some(value) => Ok((remaining, value)),
        None => Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Verify),
        })),
    }
}

// ----- strings ------------------------------------------------------------

/// `quoted = DQUOTE *QUOTED-CHAR DQUOTE`
pub(crate) fn quoted(input: &[u8]) -> WireResult<IString> {
    let mut parser = tuple((
        dquote,
        map(
            opt(escaped(
                take_while1(is_any_text_char_except_quoted_specials),
                '\\',
                one_of("\\\""),
            )),
            |quoted: Option<&[u8]>| quoted.unwrap_or_default(),
        ),
        dquote,
    ));

    let (remaining, (_, quoted, _)) = parser(input)?;

    // Quoted strings are ASCII by construction.
    let unescaped = unescape_quoted(from_utf8(quoted).unwrap());

    Ok((remaining, IString::from(unescaped.as_ref())))
}

/// `QUOTED-CHAR = <any TEXT-CHAR except quoted-specials> / "\" quoted-specials`
pub(crate) fn quoted_char(input: &[u8]) -> WireResult<QuotedChar> {
    map(
        alt((
            map(
                take_while_m_n(1, 1, is_any_text_char_except_quoted_specials),
                |bytes: &[u8]| bytes[0] as char,
            ),
            map(
                tuple((tag("\\"), take_while_m_n(1, 1, is_quoted_specials))),
                |(_, bytes): (_, &[u8])| bytes[0] as char,
            ),
        )),
        QuotedChar::unvalidated,
    )(input)
}

/// A parsed literal header `{n}` / `{n+}` / `~{n}` / `~{n+}`, including the
/// trailing CRLF.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct LiteralHeader {
    pub(crate) length: u32,
    pub(crate) non_sync: bool,
    pub(crate) binary: bool,
}

/// `literal = "{" number ["+"] "}" CRLF` (header only)
pub(crate) fn literal_header(input: &[u8]) -> WireResult<LiteralHeader> {
    let (remaining, (binary, _, length, plus, _, _)) = tuple((
        map(opt(tag(b"~")), |tilde| tilde.is_some()),
        tag(b"{"),
        number,
        map(opt(tag(b"+")), |plus| plus.is_some()),
        tag(b"}"),
        tag(b"\r\n"),
    ))(input)?;

    Ok((
        remaining,
        LiteralHeader {
            length,
            non_sync: plus,
            binary,
        },
    ))
}

/// `literal = "{" number ["+"] "}" CRLF *CHAR8` — header plus payload.
pub(crate) fn literal(input: &[u8]) -> WireResult<IString> {
    let (remaining, header) = literal_header(input)?;

    if header.binary {
        return Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Tag),
        }));
    }

    let (remaining, data) = take(header.length)(remaining)?;

    if data.contains(&0x00) {
        return Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::LiteralContainsNul,
        }));
    }

    Ok((remaining, IString::from(data)))
}

/// `literal8 = "~{" number ["+"] "}" CRLF *OCTET` (RFC 3516); may contain NUL.
pub(crate) fn literal8(input: &[u8]) -> WireResult<IString> {
    let (remaining, header) = literal_header(input)?;

    if !header.binary {
        return Err(nom::Err::Error(WireParseError {
            input,
            kind: WireErrorKind::Nom(ErrorKind::Tag),
        }));
    }

    let (remaining, data) = take(header.length)(remaining)?;

    Ok((remaining, IString::from(data)))
}

/// `string = quoted / literal`
pub(crate) fn string(input: &[u8]) -> WireResult<IString> {
    alt((quoted, literal))(input)
}

/// `astring = 1*ASTRING-CHAR / string`
pub(crate) fn astring(input: &[u8]) -> WireResult<IString> {
    alt((
        map(take_while1(is_astring_char), IString::from),
        string,
    ))(input)
}

#[inline]
/// `nil = "NIL"`
pub(crate) fn nil(input: &[u8]) -> WireResult<&[u8]> {
    tag_no_case(b"NIL")(input)
}

/// `nstring = string / nil`
pub(crate) fn nstring(input: &[u8]) -> WireResult<NString> {
    alt((
        map(string, |value| NString(Some(value))),
        map(nil, |_| NString(None)),
    ))(input)
}

/// `nstring` extended with binary literals, for BINARY fetch data and
/// metadata values.
pub(crate) fn nstring8(input: &[u8]) -> WireResult<NString> {
    alt((
        map(alt((quoted, literal, literal8)), |value| {
            NString(Some(value))
        }),
        map(nil, |_| NString(None)),
    ))(input)
}

// ----- atoms and friends --------------------------------------------------

/// `atom = 1*ATOM-CHAR`
pub(crate) fn atom(input: &[u8]) -> WireResult<Atom> {
    let (remaining, parsed) = take_while1(is_atom_char)(input)?;

    // Atom chars are ASCII.
    Ok((remaining, Atom::unvalidated(from_utf8(parsed).unwrap())))
}

/// `tag = 1*<any ASTRING-CHAR except "+">`
pub(crate) fn tag_imap(input: &[u8]) -> WireResult<Tag> {
    map(
        take_while1(|b| is_astring_char(b) && b != b'+'),
        |parsed: &[u8]| Tag::unvalidated(from_utf8(parsed).unwrap()),
    )(input)
}

/// `text = 1*TEXT-CHAR`
pub(crate) fn text(input: &[u8]) -> WireResult<Text> {
    map(take_while1(is_text_char), |parsed: &[u8]| {
        Text::unvalidated(from_utf8(parsed).unwrap())
    })(input)
}

/// `charset = atom / quoted`
pub(crate) fn charset(input: &[u8]) -> WireResult<Charset> {
    alt((
        map(atom, |atom| Charset::unvalidated(atom.inner().to_owned())),
        map(quoted, |quoted| {
            // Quoted strings are ASCII.
            Charset::unvalidated(from_utf8(quoted.as_bytes()).unwrap().to_owned())
        }),
    ))(input)
}

// ----- base64 -------------------------------------------------------------

/// `base64 = *(4base64-char) [base64-terminal]`
pub(crate) fn base64(input: &[u8]) -> WireResult<Vec<u8>> {
    map_res(
        recognize(tuple((
            take_while(is_base64_char),
            opt(alt((tag("=="), tag("=")))),
        ))),
        |encoded| base64_engine.decode(encoded),
    )(input)
}

pub(crate) fn is_base64_char(byte: u8) -> bool {
    is_alpha(byte) || is_digit(byte) || byte == b'+' || byte == b'/'
}

// ----- misc ---------------------------------------------------------------

/// CRLF, strict.
pub(crate) fn crlf(input: &[u8]) -> WireResult<&[u8]> {
    tag(b"\r\n")(input)
}

/// A single SP.
pub(crate) fn sp(input: &[u8]) -> WireResult<&[u8]> {
    tag(b" ")(input)
}

/// Keyword terminated by a mandatory space.
pub(crate) fn keyword_sp<'a>(
    keyword: &'static str,
) -> impl FnMut(&'a [u8]) -> WireResult<'a, &'a [u8]> {
    terminated(tag_no_case(keyword), sp)
}
