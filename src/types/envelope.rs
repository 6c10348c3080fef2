//! The FETCH `ENVELOPE` structure.

use crate::core::NString;

/// `envelope = "(" env-date SP env-subject SP env-from SP env-sender SP
///              env-reply-to SP env-to SP env-cc SP env-bcc SP
///              env-in-reply-to SP env-message-id ")"`
///
/// An empty address list is rendered as `NIL`, never as `()`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Envelope {
    pub date: NString,
    pub subject: NString,
    pub from: Vec<Address>,
    pub sender: Vec<Address>,
    pub reply_to: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub in_reply_to: NString,
    pub message_id: NString,
}

/// `address = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"`
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Address {
    pub name: NString,
    pub adl: NString,
    pub mailbox: NString,
    pub host: NString,
}
