//! `Encode` implementations for the client side of the wire.

use base64::{engine::general_purpose::STANDARD as base64, Engine};

use crate::{
    encode::{join, paren_list, Encode, EncodeBuffer},
    types::{
        auth::{AuthMechanism, AuthenticateData},
        command::{
            AppendMessage, Command, CommandBody, FetchModifier, IdleDone, ListReturnOption,
            ListSelectionOption, SelectParameter, StoreModifier,
        },
        fetch::{macros, MessageDataItemName},
        flag::{StoreResponse, StoreType},
        metadata::{EntryValue, GetMetadataOption, MetadataDepth},
        search::{SearchKey, SearchReturnOption},
        status::StatusDataItemName,
        urlauth::{UrlMechanism, UrlRump},
    },
};

impl Encode for Command {
    fn encode(&self, buf: &mut EncodeBuffer) {
        self.tag.encode(buf);
        buf.write_space();
        self.body.encode(buf);
        buf.write_str("\r\n");
    }
}

impl Encode for CommandBody {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Capability => buf.write_str("CAPABILITY"),
            Self::Noop => buf.write_str("NOOP"),
            Self::Logout => buf.write_str("LOGOUT"),
            Self::StartTls => buf.write_str("STARTTLS"),
            Self::Id { parameters } => {
                buf.write_str("ID ");
                parameters.encode(buf);
            }
            Self::Authenticate {
                mechanism,
                initial_response,
            } => {
                buf.write_str("AUTHENTICATE ");
                mechanism.encode(buf);

                if let Some(initial_response) = initial_response {
                    buf.write_space();

                    // RFC 4959: a zero-length initial response is sent as a
                    // single pad character.
                    let data = initial_response.declassify();
                    if data.is_empty() {
                        buf.write_str("=");
                    } else {
                        buf.write_str(&base64.encode(data));
                    }
                }
            }
            Self::Login { username, password } => {
                buf.write_str("LOGIN ");
                username.encode(buf);
                buf.write_space();
                password.declassify().encode(buf);
            }
            Self::Select {
                mailbox,
                parameters,
            } => {
                buf.write_str("SELECT ");
                mailbox.encode(buf);
                if !parameters.is_empty() {
                    buf.write_space();
                    paren_list(buf, parameters);
                }
            }
            Self::Examine {
                mailbox,
                parameters,
            } => {
                buf.write_str("EXAMINE ");
                mailbox.encode(buf);
                if !parameters.is_empty() {
                    buf.write_space();
                    paren_list(buf, parameters);
                }
            }
            Self::Create {
                mailbox,
                parameters,
            } => {
                buf.write_str("CREATE ");
                mailbox.encode(buf);
                if !parameters.is_empty() {
                    buf.write_space();
                    paren_list(buf, parameters);
                }
            }
            Self::Delete { mailbox } => {
                buf.write_str("DELETE ");
                mailbox.encode(buf);
            }
            Self::Rename {
                from,
                to,
                parameters,
            } => {
                buf.write_str("RENAME ");
                from.encode(buf);
                buf.write_space();
                to.encode(buf);
                if !parameters.is_empty() {
                    buf.write_space();
                    paren_list(buf, parameters);
                }
            }
            Self::Subscribe { mailbox } => {
                buf.write_str("SUBSCRIBE ");
                mailbox.encode(buf);
            }
            Self::Unsubscribe { mailbox } => {
                buf.write_str("UNSUBSCRIBE ");
                mailbox.encode(buf);
            }
            Self::List {
                selection_options,
                reference,
                patterns,
                return_options,
            } => {
                buf.write_str("LIST");
                if !selection_options.is_empty() {
                    buf.write_space();
                    paren_list(buf, selection_options);
                }
                buf.write_space();
                reference.encode(buf);
                buf.write_space();
                if patterns.len() == 1 {
                    patterns.head().encode(buf);
                } else {
                    paren_list(buf, patterns.as_ref());
                }
                if !return_options.is_empty() {
                    buf.write_str(" RETURN ");
                    paren_list(buf, return_options);
                }
            }
            Self::Lsub { reference, pattern } => {
                buf.write_str("LSUB ");
                reference.encode(buf);
                buf.write_space();
                pattern.encode(buf);
            }
            Self::Status {
                mailbox,
                item_names,
            } => {
                buf.write_str("STATUS ");
                mailbox.encode(buf);
                buf.write_space();
                // STATUS attributes are parenthesized even when single.
                paren_list(buf, item_names);
            }
            Self::Append { mailbox, messages } => {
                buf.write_str("APPEND ");
                mailbox.encode(buf);
                for message in messages {
                    message.encode(buf);
                }
            }
            Self::Idle => buf.write_str("IDLE"),
            Self::Namespace => buf.write_str("NAMESPACE"),
            Self::Enable { capabilities } => {
                buf.write_str("ENABLE ");
                join(buf, capabilities.as_ref(), " ");
            }
            Self::GetMetadata {
                options,
                mailbox,
                entries,
            } => {
                buf.write_str("GETMETADATA");
                if !options.is_empty() {
                    buf.write_space();
                    paren_list(buf, options);
                }
                buf.write_space();
                mailbox.encode(buf);
                buf.write_space();
                if entries.len() == 1 {
                    entries.head().encode(buf);
                } else {
                    paren_list(buf, entries.as_ref());
                }
            }
            Self::SetMetadata { mailbox, entries } => {
                buf.write_str("SETMETADATA ");
                mailbox.encode(buf);
                buf.write_space();
                paren_list(buf, entries.as_ref());
            }
            Self::UrlFetch { urls } => {
                buf.write_str("URLFETCH");
                for url in urls {
                    buf.write_space();
                    url.encode(buf);
                }
            }
            Self::GenUrlAuth { rumps } => {
                buf.write_str("GENURLAUTH");
                for rump in rumps {
                    buf.write_space();
                    rump.encode(buf);
                }
            }
            Self::ResetKey { mailbox } => {
                buf.write_str("RESETKEY");
                if let Some((mailbox, mechanisms)) = mailbox {
                    buf.write_space();
                    mailbox.encode(buf);
                    for mechanism in mechanisms {
                        buf.write_space();
                        mechanism.encode(buf);
                    }
                }
            }
            Self::Check => buf.write_str("CHECK"),
            Self::Close => buf.write_str("CLOSE"),
            Self::Expunge => buf.write_str("EXPUNGE"),
            Self::Search {
                return_options,
                charset,
                criteria,
                uid,
            } => {
                if *uid {
                    buf.write_str("UID ");
                }
                buf.write_str("SEARCH");
                if !return_options.is_empty() {
                    buf.write_str(" RETURN ");
                    paren_list(buf, return_options);
                }
                if let Some(charset) = charset {
                    buf.write_str(" CHARSET ");
                    charset.encode(buf);
                }
                buf.write_space();
                join(buf, criteria.as_ref(), " ");
            }
            Self::Fetch {
                sequence_set,
                items,
                modifiers,
                uid,
            } => {
                if *uid {
                    buf.write_str("UID ");
                }
                buf.write_str("FETCH ");
                sequence_set.encode(buf);
                buf.write_space();

                if let Some(keyword) = macro_keyword(items) {
                    buf.write_str(keyword);
                } else if items.len() == 1 {
                    items[0].encode(buf);
                } else {
                    paren_list(buf, items);
                }

                if !modifiers.is_empty() {
                    buf.write_space();
                    paren_list(buf, modifiers);
                }
            }
            Self::Store {
                sequence_set,
                kind,
                response,
                flags,
                modifiers,
                uid,
            } => {
                if *uid {
                    buf.write_str("UID ");
                }
                buf.write_str("STORE ");
                sequence_set.encode(buf);
                if !modifiers.is_empty() {
                    buf.write_space();
                    paren_list(buf, modifiers);
                }
                buf.write_space();
                match kind {
                    StoreType::Add => buf.write_str("+"),
                    StoreType::Remove => buf.write_str("-"),
                    StoreType::Replace => {}
                }
                buf.write_str("FLAGS");
                if *response == StoreResponse::Silent {
                    buf.write_str(".SILENT");
                }
                buf.write_space();
                paren_list(buf, flags);
            }
            Self::Copy {
                sequence_set,
                mailbox,
                uid,
            } => {
                if *uid {
                    buf.write_str("UID ");
                }
                buf.write_str("COPY ");
                sequence_set.encode(buf);
                buf.write_space();
                mailbox.encode(buf);
            }
            Self::Move {
                sequence_set,
                mailbox,
                uid,
            } => {
                if *uid {
                    buf.write_str("UID ");
                }
                buf.write_str("MOVE ");
                sequence_set.encode(buf);
                buf.write_space();
                mailbox.encode(buf);
            }
        }
    }
}

/// The macro keyword for an attribute list that equals one of the canonical
/// macro expansions (as a set).
fn macro_keyword(items: &[MessageDataItemName]) -> Option<&'static str> {
    fn set_eq(a: &[MessageDataItemName], b: &[MessageDataItemName]) -> bool {
        a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
    }

    if set_eq(items, macros::FULL) {
        Some("FULL")
    } else if set_eq(items, macros::ALL) {
        Some("ALL")
    } else if set_eq(items, macros::FAST) {
        Some("FAST")
    } else {
        None
    }
}

impl Encode for AppendMessage {
    fn encode(&self, buf: &mut EncodeBuffer) {
        if !self.flags.is_empty() {
            buf.write_space();
            paren_list(buf, &self.flags);
        }

        if let Some(date) = &self.date {
            buf.write_space();
            date.encode(buf);
        }

        buf.write_space();
        if self.data.contains(&0x00) {
            buf.write_literal8(&self.data);
        } else {
            buf.write_literal(&self.data);
        }
    }
}

impl Encode for IdleDone {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("DONE\r\n");
    }
}

impl Encode for AuthMechanism {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(self.as_str());
    }
}

impl Encode for AuthenticateData {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Continue(data) => {
                buf.write_str(&base64.encode(data.declassify()));
                buf.write_str("\r\n");
            }
            Self::Cancel => buf.write_str("*\r\n"),
        }
    }
}

impl Encode for crate::types::id::IdParameters {
    fn encode(&self, buf: &mut EncodeBuffer) {
        if self.is_empty() {
            buf.write_nil();
            return;
        }

        buf.write_str("(");
        for (index, (key, value)) in self.as_pairs().iter().enumerate() {
            if index > 0 {
                buf.write_space();
            }
            key.encode(buf);
            buf.write_space();
            value.encode(buf);
        }
        buf.write_str(")");
    }
}

impl Encode for SelectParameter {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::CondStore => buf.write_str("CONDSTORE"),
            Self::Other(extension) => extension.encode(buf),
        }
    }
}

impl Encode for ListSelectionOption {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Subscribed => buf.write_str("SUBSCRIBED"),
            Self::Remote => buf.write_str("REMOTE"),
            Self::RecursiveMatch => buf.write_str("RECURSIVEMATCH"),
            Self::Other(extension) => extension.encode(buf),
        }
    }
}

impl Encode for ListReturnOption {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Subscribed => buf.write_str("SUBSCRIBED"),
            Self::Children => buf.write_str("CHILDREN"),
            Self::Other(extension) => extension.encode(buf),
        }
    }
}

impl Encode for FetchModifier {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::ChangedSince(value) => {
                buf.write_str("CHANGEDSINCE ");
                buf.write_u64(*value);
            }
            Self::Other(extension) => extension.encode(buf),
        }
    }
}

impl Encode for StoreModifier {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::UnchangedSince(value) => {
                buf.write_str("UNCHANGEDSINCE ");
                buf.write_u64(*value);
            }
            Self::Other(extension) => extension.encode(buf),
        }
    }
}

impl Encode for StatusDataItemName {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(match self {
            Self::Messages => "MESSAGES",
            Self::Recent => "RECENT",
            Self::UidNext => "UIDNEXT",
            Self::UidValidity => "UIDVALIDITY",
            Self::Unseen => "UNSEEN",
            Self::HighestModSeq => "HIGHESTMODSEQ",
        });
    }
}

impl Encode for GetMetadataOption {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::MaxSize(size) => {
                buf.write_str("MAXSIZE ");
                buf.write_u32(*size);
            }
            Self::Depth(depth) => {
                buf.write_str("DEPTH ");
                depth.encode(buf);
            }
        }
    }
}

impl Encode for MetadataDepth {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        });
    }
}

impl Encode for EntryValue {
    fn encode(&self, buf: &mut EncodeBuffer) {
        self.entry.encode(buf);
        buf.write_space();
        buf.write_nstring(&self.value);
    }
}

impl Encode for UrlRump {
    fn encode(&self, buf: &mut EncodeBuffer) {
        self.url.encode(buf);
        buf.write_space();
        self.mechanism.encode(buf);
    }
}

impl Encode for UrlMechanism {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(self.as_str());
    }
}

impl Encode for SearchReturnOption {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::All => "ALL",
            Self::Count => "COUNT",
        });
    }
}

impl Encode for SearchKey {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::And(criteria) => paren_list(buf, criteria.as_ref()),
            Self::SequenceSet(set) => set.encode(buf),
            Self::All => buf.write_str("ALL"),
            Self::Answered => buf.write_str("ANSWERED"),
            Self::Bcc(value) => {
                buf.write_str("BCC ");
                value.encode(buf);
            }
            Self::Before(date) => {
                buf.write_str("BEFORE ");
                date.encode(buf);
            }
            Self::Body(value) => {
                buf.write_str("BODY ");
                value.encode(buf);
            }
            Self::Cc(value) => {
                buf.write_str("CC ");
                value.encode(buf);
            }
            Self::Deleted => buf.write_str("DELETED"),
            Self::Draft => buf.write_str("DRAFT"),
            Self::Flagged => buf.write_str("FLAGGED"),
            Self::From(value) => {
                buf.write_str("FROM ");
                value.encode(buf);
            }
            Self::Header(field, value) => {
                buf.write_str("HEADER ");
                field.encode(buf);
                buf.write_space();
                value.encode(buf);
            }
            Self::Keyword(flag) => {
                buf.write_str("KEYWORD ");
                flag.encode(buf);
            }
            Self::Larger(size) => {
                buf.write_str("LARGER ");
                buf.write_u32(*size);
            }
            Self::ModSeq(value) => {
                buf.write_str("MODSEQ ");
                buf.write_u64(*value);
            }
            Self::New => buf.write_str("NEW"),
            Self::Not(key) => {
                buf.write_str("NOT ");
                key.encode(buf);
            }
            Self::Old => buf.write_str("OLD"),
            Self::On(date) => {
                buf.write_str("ON ");
                date.encode(buf);
            }
            Self::Or(left, right) => {
                buf.write_str("OR ");
                left.encode(buf);
                buf.write_space();
                right.encode(buf);
            }
            Self::Recent => buf.write_str("RECENT"),
            Self::Seen => buf.write_str("SEEN"),
            Self::SentBefore(date) => {
                buf.write_str("SENTBEFORE ");
                date.encode(buf);
            }
            Self::SentOn(date) => {
                buf.write_str("SENTON ");
                date.encode(buf);
            }
            Self::SentSince(date) => {
                buf.write_str("SENTSINCE ");
                date.encode(buf);
            }
            Self::Since(date) => {
                buf.write_str("SINCE ");
                date.encode(buf);
            }
            Self::Smaller(size) => {
                buf.write_str("SMALLER ");
                buf.write_u32(*size);
            }
            Self::Subject(value) => {
                buf.write_str("SUBJECT ");
                value.encode(buf);
            }
            Self::Text(value) => {
                buf.write_str("TEXT ");
                value.encode(buf);
            }
            Self::To(value) => {
                buf.write_str("TO ");
                value.encode(buf);
            }
            Self::Uid(set) => {
                buf.write_str("UID ");
                set.encode(buf);
            }
            Self::Unanswered => buf.write_str("UNANSWERED"),
            Self::Undeleted => buf.write_str("UNDELETED"),
            Self::Undraft => buf.write_str("UNDRAFT"),
            Self::Unflagged => buf.write_str("UNFLAGGED"),
            Self::Unkeyword(flag) => {
                buf.write_str("UNKEYWORD ");
                flag.encode(buf);
            }
            Self::Unseen => buf.write_str("UNSEEN"),
        }
    }
}

impl Encode for MessageDataItemName {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Body => buf.write_str("BODY"),
            Self::BodyExt {
                section,
                partial,
                peek,
            } => {
                if *peek {
                    buf.write_str("BODY.PEEK[");
                } else {
                    buf.write_str("BODY[");
                }
                if let Some(section) = section {
                    section.encode(buf);
                }
                buf.write_str("]");
                if let Some((offset, length)) = partial {
                    buf.write_str(&format!("<{}.{}>", offset, length));
                }
            }
            Self::BodyStructure => buf.write_str("BODYSTRUCTURE"),
            Self::Envelope => buf.write_str("ENVELOPE"),
            Self::Flags => buf.write_str("FLAGS"),
            Self::InternalDate => buf.write_str("INTERNALDATE"),
            Self::Rfc822 => buf.write_str("RFC822"),
            Self::Rfc822Header => buf.write_str("RFC822.HEADER"),
            Self::Rfc822Size => buf.write_str("RFC822.SIZE"),
            Self::Rfc822Text => buf.write_str("RFC822.TEXT"),
            Self::Uid => buf.write_str("UID"),
            Self::Binary {
                section,
                partial,
                peek,
            } => {
                if *peek {
                    buf.write_str("BINARY.PEEK[");
                } else {
                    buf.write_str("BINARY[");
                }
                join(buf, section, ".");
                buf.write_str("]");
                if let Some((offset, length)) = partial {
                    buf.write_str(&format!("<{}.{}>", offset, length));
                }
            }
            Self::BinarySize { section } => {
                buf.write_str("BINARY.SIZE[");
                join(buf, section, ".");
                buf.write_str("]");
            }
            Self::ModSeq => buf.write_str("MODSEQ"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{
        core::NonEmptyVec,
        encode::encode_command,
        testing::encodes_to_server,
        types::capability::{Capabilities, Capability},
    };

    #[test]
    fn test_fetch_macro_canonicalization() {
        use MessageDataItemName::*;

        let body = CommandBody::fetch("1:5", vec![Flags, InternalDate, Rfc822Size], false).unwrap();
        encodes_to_server(&body, b"FETCH 1:5 FAST");

        // Set comparison ignores order.
        let body =
            CommandBody::fetch("1", vec![Envelope, Flags, InternalDate, Rfc822Size], true).unwrap();
        encodes_to_server(&body, b"UID FETCH 1 ALL");

        let body = CommandBody::fetch(
            "1",
            vec![Flags, InternalDate, Rfc822Size, Envelope, Body],
            false,
        )
        .unwrap();
        encodes_to_server(&body, b"FETCH 1 FULL");

        let body = CommandBody::fetch("1", vec![Flags, Uid], false).unwrap();
        encodes_to_server(&body, b"FETCH 1 (FLAGS UID)");

        let body = CommandBody::fetch("1", vec![Flags], false).unwrap();
        encodes_to_server(&body, b"FETCH 1 FLAGS");
    }

    #[test]
    fn test_append_chunking() {
        let command = Command::new(
            "A001",
            CommandBody::append(
                "inbox",
                AppendMessage {
                    flags: vec![crate::types::flag::Flag::Seen],
                    date: None,
                    data: b"hello".to_vec(),
                },
            )
            .unwrap(),
        )
        .unwrap();

        // Without LITERAL+, the literal splits the output into two chunks.
        let chunks: Vec<Vec<u8>> = encode_command(&command, &Capabilities::new()).collect();
        assert_eq!(
            chunks,
            vec![
                b"A001 APPEND \"INBOX\" (\\Seen) {5}\r\n".to_vec(),
                b"hello\r\n".to_vec(),
            ],
        );

        // With LITERAL+, a single chunk.
        let caps = Capabilities::from_iter([Capability::LiteralPlus]);
        let chunks: Vec<Vec<u8>> = encode_command(&command, &caps).collect();
        assert_eq!(
            chunks,
            vec![b"A001 APPEND \"INBOX\" (\\Seen) {5+}\r\nhello\r\n".to_vec()],
        );
    }

    #[test]
    fn test_store_encoding() {
        let body = CommandBody::Store {
            sequence_set: "2:4".parse().unwrap(),
            kind: StoreType::Add,
            response: StoreResponse::Silent,
            flags: vec![crate::types::flag::Flag::Deleted],
            modifiers: vec![StoreModifier::UnchangedSince(12345)],
            uid: false,
        };

        encodes_to_server(
            &body,
            b"STORE 2:4 (UNCHANGEDSINCE 12345) +FLAGS.SILENT (\\Deleted)",
        );
    }

    #[test]
    fn test_search_with_return_options() {
        let body = CommandBody::Search {
            return_options: vec![SearchReturnOption::Min, SearchReturnOption::Count],
            charset: None,
            criteria: NonEmptyVec::new(SearchKey::Unseen),
            uid: true,
        };

        encodes_to_server(&body, b"UID SEARCH RETURN (MIN COUNT) UNSEEN");
    }

    #[test]
    fn test_fetch_att_names() {
        use crate::types::fetch::Section;

        encodes_to_server(
            &MessageDataItemName::BodyExt {
                section: None,
                partial: None,
                peek: false,
            },
            b"BODY[]",
        );

        encodes_to_server(
            &MessageDataItemName::BodyExt {
                section: Some(Section::Text(None)),
                partial: Some((42, NonZeroU32::new(1337).unwrap())),
                peek: true,
            },
            b"BODY.PEEK[TEXT]<42.1337>",
        );

        encodes_to_server(
            &MessageDataItemName::Binary {
                section: vec![NonZeroU32::new(1).unwrap(), NonZeroU32::new(2).unwrap()],
                partial: None,
                peek: false,
            },
            b"BINARY[1.2]",
        );

        encodes_to_server(
            &MessageDataItemName::BinarySize {
                section: vec![NonZeroU32::new(3).unwrap()],
            },
            b"BINARY.SIZE[3]",
        );
    }
}
