//! BODYSTRUCTURE parsing.
//!
//! The structure is recursive; a depth budget turns pathological nesting
//! into a parse failure instead of exhausting the stack.

use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::{map, opt, verify},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    core::IString,
    parse::{
        core::{nil, nstring, number, sp, string},
        envelope::envelope,
        WireErrorKind, WireParseError, WireResult,
    },
    types::body::{
        BasicFields, Body, BodyExtension, BodyStructure, Disposition, Language, Location,
        MultiPartExtension, SinglePartExtension, SpecificFields,
    },
};

/// Nesting budget for bodies and body extensions.
const MAX_DEPTH: usize = 8;

/// `body = "(" (body-type-1part / body-type-mpart) ")"`
pub(crate) fn body(input: &[u8]) -> WireResult<BodyStructure> {
    body_limited(input, MAX_DEPTH)
}

fn body_limited(input: &[u8], depth: usize) -> WireResult<BodyStructure> {
    if depth == 0 {
        return Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::TooDeep,
        }));
    }

    delimited(
        tag(b"("),
        alt((
            move |input| body_type_1part(input, depth - 1),
            move |input| body_type_mpart(input, depth - 1),
        )),
        tag(b")"),
    )(input)
}

/// `body-type-1part = (body-type-msg / body-type-text / body-type-basic)
///                    [SP body-ext-1part]`
fn body_type_1part(input: &[u8], depth: usize) -> WireResult<BodyStructure> {
    let (remaining, body) = alt((
        move |input| body_type_msg(input, depth),
        body_type_text,
        body_type_basic,
    ))(input)?;

    let (remaining, extension_data) = opt(preceded(sp, ext_1part))(remaining)?;

    Ok((
        remaining,
        BodyStructure::Single {
            body,
            extension_data,
        },
    ))
}

fn media_keyword<'a>(
    keyword: &'static [u8],
) -> impl FnMut(&'a [u8]) -> WireResult<'a, IString> {
    verify(string, move |value: &IString| {
        value.as_bytes().eq_ignore_ascii_case(keyword)
    })
}

/// `body-type-msg = media-message SP body-fields SP envelope SP body SP
///                  body-fld-lines`
fn body_type_msg(input: &[u8], depth: usize) -> WireResult<Body> {
    let (remaining, (_, _, _, _, basic, _, envelope, _, body_structure, _, number_of_lines)) =
        tuple((
            media_keyword(b"MESSAGE"),
            sp,
            media_keyword(b"RFC822"),
            sp,
            body_fields,
            sp,
            envelope,
            sp,
            move |input| body_limited(input, depth),
            sp,
            number,
        ))(input)?;

    Ok((
        remaining,
        Body {
            basic,
            specific: SpecificFields::Message {
                envelope: Box::new(envelope),
                body_structure: Box::new(body_structure),
                number_of_lines,
            },
        },
    ))
}

/// `body-type-text = media-text SP body-fields SP body-fld-lines`
fn body_type_text(input: &[u8]) -> WireResult<Body> {
    let (remaining, (_, _, subtype, _, basic, _, number_of_lines)) = tuple((
        media_keyword(b"TEXT"),
        sp,
        string,
        sp,
        body_fields,
        sp,
        number,
    ))(input)?;

    Ok((
        remaining,
        Body {
            basic,
            specific: SpecificFields::Text {
                subtype,
                number_of_lines,
            },
        },
    ))
}

/// `body-type-basic = media-basic SP body-fields`
fn body_type_basic(input: &[u8]) -> WireResult<Body> {
    let (remaining, (r#type, _, subtype, _, basic)) =
        tuple((string, sp, string, sp, body_fields))(input)?;

    Ok((
        remaining,
        Body {
            basic,
            specific: SpecificFields::Basic { r#type, subtype },
        },
    ))
}

/// `body-fields = body-fld-param SP body-fld-id SP body-fld-desc SP
///                body-fld-enc SP body-fld-octets`
fn body_fields(input: &[u8]) -> WireResult<BasicFields> {
    let (remaining, (parameter_list, _, id, _, description, _, content_transfer_encoding, _, octets)) =
        tuple((
            body_fld_param,
            sp,
            nstring,
            sp,
            nstring,
            sp,
            string,
            sp,
            number,
        ))(input)?;

    Ok((
        remaining,
        BasicFields {
            parameter_list,
            id,
            description,
            content_transfer_encoding,
            octets,
        },
    ))
}

/// `body-fld-param = "(" string SP string *(SP string SP string) ")" / nil`
fn body_fld_param(input: &[u8]) -> WireResult<Vec<(IString, IString)>> {
    alt((
        delimited(
            tag(b"("),
            separated_list1(sp, map(tuple((string, sp, string)), |(k, _, v)| (k, v))),
            tag(b")"),
        ),
        map(nil, |_| Vec::new()),
    ))(input)
}

/// `body-ext-1part = body-fld-md5 [SP body-fld-dsp ...]`
fn ext_1part(input: &[u8]) -> WireResult<SinglePartExtension> {
    let (remaining, (md5, tail)) = tuple((nstring, opt(preceded(sp, disposition))))(input)?;

    Ok((remaining, SinglePartExtension { md5, tail }))
}

/// `body-ext-mpart = body-fld-param [SP body-fld-dsp ...]`
fn ext_mpart(input: &[u8]) -> WireResult<MultiPartExtension> {
    let (remaining, (parameter_list, tail)) =
        tuple((body_fld_param, opt(preceded(sp, disposition))))(input)?;

    Ok((
        remaining,
        MultiPartExtension {
            parameter_list,
            tail,
        },
    ))
}

/// `body-fld-dsp = "(" string SP body-fld-param ")" / nil`, plus the
/// optional language tail.
fn disposition(input: &[u8]) -> WireResult<Disposition> {
    let (remaining, (disposition, tail)) = tuple((
        alt((
            map(
                delimited(
                    tag(b"("),
                    tuple((string, sp, body_fld_param)),
                    tag(b")"),
                ),
                |(value, _, parameters)| Some((value, parameters)),
            ),
            map(nil, |_| None),
        )),
        opt(preceded(sp, language)),
    ))(input)?;

    Ok((remaining, Disposition { disposition, tail }))
}

/// `body-fld-lang = nstring / "(" string *(SP string) ")"`, plus the
/// optional location tail.
fn language(input: &[u8]) -> WireResult<Language> {
    let (remaining, (languages, tail)) = tuple((
        alt((
            delimited(tag(b"("), separated_list1(sp, string), tag(b")")),
            map(nstring, |value| match value.0 {
                Some(language) => vec![language],
                None => Vec::new(),
            }),
        )),
        opt(preceded(sp, location)),
    ))(input)?;

    Ok((remaining, Language { languages, tail }))
}

/// `body-fld-loc = nstring`, plus any trailing `body-extension`s.
fn location(input: &[u8]) -> WireResult<Location> {
    let (remaining, (location, extensions)) = tuple((
        nstring,
        many0(preceded(sp, |input| body_extension(input, MAX_DEPTH))),
    ))(input)?;

    Ok((
        remaining,
        Location {
            location,
            extensions,
        },
    ))
}

/// `body-extension = nstring / number / "(" body-extension
///                   *(SP body-extension) ")"`
fn body_extension(input: &[u8], depth: usize) -> WireResult<BodyExtension> {
    if depth == 0 {
        return Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::TooDeep,
        }));
    }

    alt((
        map(nstring, BodyExtension::NString),
        map(number, BodyExtension::Number),
        map(
            delimited(
                tag(b"("),
                separated_list1(sp, move |input| body_extension(input, depth - 1)),
                tag(b")"),
            ),
            |extensions| BodyExtension::List(crate::core::NonEmptyVec::unvalidated(extensions)),
        ),
    ))(input)
}

/// `body-type-mpart = 1*body SP media-subtype [SP body-ext-mpart]`
fn body_type_mpart(input: &[u8], depth: usize) -> WireResult<BodyStructure> {
    let (remaining, (bodies, _, subtype, extension_data)) = tuple((
        many1(move |input| body_limited(input, depth)),
        sp,
        string,
        opt(preceded(sp, ext_mpart)),
    ))(input)?;

    Ok((
        remaining,
        BodyStructure::Multi {
            bodies: crate::core::NonEmptyVec::unvalidated(bodies),
            subtype,
            extension_data,
        },
    ))
}
