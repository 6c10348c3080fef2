//! ENVELOPE and address parsing.

use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::map,
    multi::many1,
    sequence::{delimited, tuple},
};

use crate::{
    parse::{
        core::{nil, nstring, sp},
        WireResult,
    },
    types::envelope::{Address, Envelope},
};

/// `envelope = "(" env-date SP env-subject SP env-from SP env-sender SP
///              env-reply-to SP env-to SP env-cc SP env-bcc SP
///              env-in-reply-to SP env-message-id ")"`
pub(crate) fn envelope(input: &[u8]) -> WireResult<Envelope> {
    let mut parser = delimited(
        tag(b"("),
        tuple((
            nstring,
            sp,
            nstring,
            sp,
            address_list,
            sp,
            address_list,
            sp,
            address_list,
            sp,
            address_list,
            sp,
            address_list,
            sp,
            address_list,
            sp,
            nstring,
            sp,
            nstring,
        )),
        tag(b")"),
    );

    let (
        remaining,
        (
            date,
            _,
            subject,
            _,
            from,
            _,
            sender,
            _,
            reply_to,
            _,
            to,
            _,
            cc,
            _,
            bcc,
            _,
            in_reply_to,
            _,
            message_id,
        ),
    ) = parser(input)?;

    Ok((
        remaining,
        Envelope {
            date,
            subject,
            from,
            sender,
            reply_to,
            to,
            cc,
            bcc,
            in_reply_to,
            message_id,
        },
    ))
}

/// `env-from (etc.) = "(" 1*address ")" / nil`
fn address_list(input: &[u8]) -> WireResult<Vec<Address>> {
    alt((
        delimited(tag(b"("), many1(address), tag(b")")),
        map(nil, |_| Vec::new()),
    ))(input)
}

/// `address = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"`
pub(crate) fn address(input: &[u8]) -> WireResult<Address> {
    let mut parser = delimited(
        tag(b"("),
        tuple((nstring, sp, nstring, sp, nstring, sp, nstring)),
        tag(b")"),
    );

    let (remaining, (name, _, adl, _, mailbox, _, host)) = parser(input)?;

    Ok((
        remaining,
        Address {
            name,
            adl,
            mailbox,
            host,
        },
    ))
}
