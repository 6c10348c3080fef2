//! Mailbox name parsing.

use nom::{branch::alt, bytes::streaming::take_while1, combinator::map};

use crate::{
    parse::{
        core::{astring, string},
        WireResult,
    },
    types::mailbox::{ListMailbox, Mailbox, MailboxOther},
    utils::indicators::is_list_char,
};

/// `mailbox = "INBOX" / astring`
///
/// The case-insensitive INBOX match happens on the parsed payload, so
/// `{5}\r\ninbox` is INBOX as well.
pub(crate) fn mailbox(input: &[u8]) -> WireResult<Mailbox> {
    map(astring, |name| {
        if name.as_bytes().eq_ignore_ascii_case(b"INBOX") {
            Mailbox::Inbox
        } else {
            Mailbox::Other(MailboxOther(name.into_bytes()))
        }
    })(input)
}

/// `list-mailbox = 1*list-char / string`
pub(crate) fn list_mailbox(input: &[u8]) -> WireResult<ListMailbox> {
    alt((
        map(take_while1(is_list_char), |token: &[u8]| {
            ListMailbox(token.to_vec())
        }),
        map(string, |string| ListMailbox(string.into_bytes())),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_inbox_folding() {
        for input in [b"inbox ".as_ref(), b"INBOX ", b"\"Inbox\" "] {
            let (_, value) = mailbox(input).unwrap();
            assert_eq!(value, Mailbox::Inbox);
        }

        let (_, value) = mailbox(b"{5}\r\ninbox\r\n").unwrap();
        assert_eq!(value, Mailbox::Inbox);
    }

    #[test]
    fn test_mailbox_other() {
        let (_, value) = mailbox(b"Archive/2024 ").unwrap();
        assert_eq!(value.as_bytes(), b"Archive/2024");
    }

    #[test]
    fn test_list_mailbox() {
        let (_, value) = list_mailbox(b"* ").unwrap();
        assert_eq!(value.as_bytes(), b"*");

        let (_, value) = list_mailbox(b"\"\" ").unwrap();
        assert_eq!(value.as_bytes(), b"");

        let (_, value) = list_mailbox(b"%/child ").unwrap();
        assert_eq!(value.as_bytes(), b"%/child");
    }
}
