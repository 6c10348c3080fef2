//! `Encode` implementations for the server side of the wire.

use base64::{engine::general_purpose::STANDARD as base64, Engine};

use crate::{
    encode::{join, paren_list, Encode, EncodeBuffer},
    core::IString,
    types::{
        body::{
            BasicFields, Body, BodyExtension, BodyStructure, Disposition, Language, Location,
            MultiPartExtension, SinglePartExtension, SpecificFields,
        },
        envelope::{Address, Envelope},
        fetch::MessageDataItem,
        metadata::MetadataResponse,
        namespace::{NamespaceClass, NamespaceDescription, NamespaceExtension},
        response::{Code, Continue, Data, Greeting, GreetingKind, Response, Status},
        search::{ExtendedSearchData, SearchReturnData},
        status::StatusDataItem,
        urlauth::UrlFetchItem,
    },
};

impl Encode for Greeting {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("* ");
        buf.write_str(match self.kind {
            GreetingKind::Ok => "OK",
            GreetingKind::PreAuth => "PREAUTH",
            GreetingKind::Bye => "BYE",
        });
        buf.write_space();
        if let Some(code) = &self.code {
            buf.write_str("[");
            code.encode(buf);
            buf.write_str("] ");
        }
        self.text.encode(buf);
        buf.write_str("\r\n");
    }
}

impl Encode for Response {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Status(status) => status.encode(buf),
            Self::Data(data) => data.encode(buf),
            Self::Continue(cont) => cont.encode(buf),
        }
    }
}

fn write_status_line(
    buf: &mut EncodeBuffer,
    tag: Option<&crate::core::Tag>,
    condition: &str,
    code: Option<&Code>,
    text: &crate::core::Text,
) {
    match tag {
        Some(tag) => tag.encode(buf),
        None => buf.write_str("*"),
    }
    buf.write_space();
    buf.write_str(condition);
    buf.write_space();
    if let Some(code) = code {
        buf.write_str("[");
        code.encode(buf);
        buf.write_str("] ");
    }
    text.encode(buf);
    buf.write_str("\r\n");
}

impl Encode for Status {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Ok { tag, code, text } => {
                write_status_line(buf, tag.as_ref(), "OK", code.as_ref(), text)
            }
            Self::No { tag, code, text } => {
                write_status_line(buf, tag.as_ref(), "NO", code.as_ref(), text)
            }
            Self::Bad { tag, code, text } => {
                write_status_line(buf, tag.as_ref(), "BAD", code.as_ref(), text)
            }
            Self::Bye { code, text } => write_status_line(buf, None, "BYE", code.as_ref(), text),
        }
    }
}

impl Encode for Continue {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Basic { code, text } => {
                buf.write_str("+ ");
                if let Some(code) = code {
                    buf.write_str("[");
                    code.encode(buf);
                    buf.write_str("] ");
                }
                text.encode(buf);
                buf.write_str("\r\n");
            }
            Self::Base64(data) => {
                buf.write_str("+ ");
                buf.write_str(&base64.encode(data));
                buf.write_str("\r\n");
            }
        }
    }
}

impl Encode for Code {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Alert => buf.write_str("ALERT"),
            Self::BadCharset { allowed } => {
                buf.write_str("BADCHARSET");
                if !allowed.is_empty() {
                    buf.write_space();
                    paren_list(buf, allowed);
                }
            }
            Self::Capability(capabilities) => {
                buf.write_str("CAPABILITY ");
                join(buf, capabilities.as_ref(), " ");
            }
            Self::Parse => buf.write_str("PARSE"),
            Self::PermanentFlags(flags) => {
                buf.write_str("PERMANENTFLAGS ");
                paren_list(buf, flags);
            }
            Self::ReadOnly => buf.write_str("READ-ONLY"),
            Self::ReadWrite => buf.write_str("READ-WRITE"),
            Self::TryCreate => buf.write_str("TRYCREATE"),
            Self::UidNext(value) => {
                buf.write_str("UIDNEXT ");
                value.encode(buf);
            }
            Self::UidValidity(value) => {
                buf.write_str("UIDVALIDITY ");
                value.encode(buf);
            }
            Self::Unseen(value) => {
                buf.write_str("UNSEEN ");
                value.encode(buf);
            }
            Self::HighestModSeq(value) => {
                buf.write_str("HIGHESTMODSEQ ");
                buf.write_u64(*value);
            }
            Self::NoModSeq => buf.write_str("NOMODSEQ"),
            Self::Modified(set) => {
                buf.write_str("MODIFIED ");
                set.encode(buf);
            }
            Self::Other { atom, arguments } => {
                atom.encode(buf);
                if let Some(arguments) = arguments {
                    buf.write_space();
                    buf.write_bytes(arguments);
                }
            }
        }
    }
}

impl Encode for Data {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Capability(capabilities) => {
                buf.write_str("* CAPABILITY ");
                join(buf, capabilities.as_ref(), " ");
            }
            Self::List {
                items,
                delimiter,
                mailbox,
                extensions,
            } => {
                buf.write_str("* LIST ");
                paren_list(buf, items);
                buf.write_space();
                match delimiter {
                    Some(delimiter) => delimiter.encode(buf),
                    None => buf.write_nil(),
                }
                buf.write_space();
                mailbox.encode(buf);
                if !extensions.is_empty() {
                    buf.write_str(" (");
                    for (index, (label, value)) in extensions.iter().enumerate() {
                        if index > 0 {
                            buf.write_space();
                        }
                        label.encode(buf);
                        buf.write_space();
                        value.encode(buf);
                    }
                    buf.write_str(")");
                }
            }
            Self::Lsub {
                items,
                delimiter,
                mailbox,
            } => {
                buf.write_str("* LSUB ");
                paren_list(buf, items);
                buf.write_space();
                match delimiter {
                    Some(delimiter) => delimiter.encode(buf),
                    None => buf.write_nil(),
                }
                buf.write_space();
                mailbox.encode(buf);
            }
            Self::Status { mailbox, items } => {
                buf.write_str("* STATUS ");
                mailbox.encode(buf);
                buf.write_space();
                // Parenthesized even for a single attribute.
                paren_list(buf, items);
            }
            Self::Search {
                seqs,
                highest_modseq,
            } => {
                buf.write_str("* SEARCH");
                for seq in seqs {
                    buf.write_space();
                    seq.encode(buf);
                }
                if let Some(highest_modseq) = highest_modseq {
                    buf.write_str(" (MODSEQ ");
                    buf.write_u64(*highest_modseq);
                    buf.write_str(")");
                }
            }
            Self::ExtendedSearch(data) => {
                buf.write_str("* ESEARCH");
                data.encode(buf);
            }
            Self::Flags(flags) => {
                buf.write_str("* FLAGS ");
                paren_list(buf, flags);
            }
            Self::Exists(count) => {
                buf.write_str("* ");
                buf.write_u32(*count);
                buf.write_str(" EXISTS");
            }
            Self::Recent(count) => {
                buf.write_str("* ");
                buf.write_u32(*count);
                buf.write_str(" RECENT");
            }
            Self::Expunge(seq) => {
                buf.write_str("* ");
                seq.encode(buf);
                buf.write_str(" EXPUNGE");
            }
            Self::Fetch { seq, items } => {
                buf.write_str("* ");
                seq.encode(buf);
                buf.write_str(" FETCH ");
                paren_list(buf, items.as_ref());
            }
            Self::Enabled { capabilities } => {
                buf.write_str("* ENABLED");
                for capability in capabilities {
                    buf.write_space();
                    capability.encode(buf);
                }
            }
            Self::Id { parameters } => {
                buf.write_str("* ID ");
                parameters.encode(buf);
            }
            Self::Namespace {
                personal,
                other,
                shared,
            } => {
                buf.write_str("* NAMESPACE ");
                write_namespace_class(buf, personal);
                buf.write_space();
                write_namespace_class(buf, other);
                buf.write_space();
                write_namespace_class(buf, shared);
            }
            Self::Metadata { mailbox, items } => {
                buf.write_str("* METADATA ");
                mailbox.encode(buf);
                buf.write_space();
                items.encode(buf);
            }
            Self::GenUrlAuth(urls) => {
                buf.write_str("* GENURLAUTH");
                for url in urls {
                    buf.write_space();
                    url.encode(buf);
                }
            }
            Self::UrlFetch(items) => {
                buf.write_str("* URLFETCH");
                for item in items {
                    buf.write_space();
                    item.encode(buf);
                }
            }
        }

        buf.write_str("\r\n");
    }
}

impl Encode for ExtendedSearchData {
    fn encode(&self, buf: &mut EncodeBuffer) {
        if let Some(correlator) = &self.correlator {
            buf.write_str(" (TAG ");
            buf.write_imap_string(correlator.inner().as_bytes());
            buf.write_str(")");
        }
        if self.uid {
            buf.write_str(" UID");
        }
        for data in &self.returns {
            buf.write_space();
            data.encode(buf);
        }
    }
}

impl Encode for SearchReturnData {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Min(value) => {
                buf.write_str("MIN ");
                value.encode(buf);
            }
            Self::Max(value) => {
                buf.write_str("MAX ");
                value.encode(buf);
            }
            Self::All(set) => {
                buf.write_str("ALL ");
                set.encode(buf);
            }
            Self::Count(value) => {
                buf.write_str("COUNT ");
                buf.write_u32(*value);
            }
            Self::ModSeq(value) => {
                buf.write_str("MODSEQ ");
                buf.write_u64(*value);
            }
        }
    }
}

impl Encode for StatusDataItem {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Messages(count) => {
                buf.write_str("MESSAGES ");
                buf.write_u32(*count);
            }
            Self::Recent(count) => {
                buf.write_str("RECENT ");
                buf.write_u32(*count);
            }
            Self::UidNext(value) => {
                buf.write_str("UIDNEXT ");
                value.encode(buf);
            }
            Self::UidValidity(value) => {
                buf.write_str("UIDVALIDITY ");
                value.encode(buf);
            }
            Self::Unseen(count) => {
                buf.write_str("UNSEEN ");
                buf.write_u32(*count);
            }
            Self::HighestModSeq(value) => {
                buf.write_str("HIGHESTMODSEQ ");
                buf.write_u64(*value);
            }
        }
    }
}

fn write_namespace_class(buf: &mut EncodeBuffer, class: &NamespaceClass) {
    match class {
        None => buf.write_nil(),
        Some(descriptions) => {
            buf.write_str("(");
            for description in descriptions {
                description.encode(buf);
            }
            buf.write_str(")");
        }
    }
}

impl Encode for NamespaceDescription {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("(");
        self.prefix.encode(buf);
        buf.write_space();
        match &self.delimiter {
            Some(delimiter) => delimiter.encode(buf),
            None => buf.write_nil(),
        }
        for extension in &self.extensions {
            extension.encode(buf);
        }
        buf.write_str(")");
    }
}

impl Encode for NamespaceExtension {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_space();
        self.label.encode(buf);
        buf.write_str(" ");
        paren_list(buf, self.values.as_ref());
    }
}

impl Encode for MetadataResponse {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::WithValues(entries) => paren_list(buf, entries.as_ref()),
            Self::WithoutValues(entries) => join(buf, entries.as_ref(), " "),
        }
    }
}

impl Encode for UrlFetchItem {
    fn encode(&self, buf: &mut EncodeBuffer) {
        self.url.encode(buf);
        buf.write_space();
        buf.write_nstring(&self.data);
    }
}

impl Encode for MessageDataItem {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Body(structure) => {
                buf.write_str("BODY ");
                structure.encode(buf);
            }
            Self::BodyExt {
                section,
                origin,
                data,
            } => {
                buf.write_str("BODY[");
                if let Some(section) = section {
                    section.encode(buf);
                }
                buf.write_str("]");
                if let Some(origin) = origin {
                    buf.write_str(&format!("<{}>", origin));
                }
                buf.write_space();
                buf.write_nstring(data);
            }
            Self::BodyStructure(structure) => {
                buf.write_str("BODYSTRUCTURE ");
                structure.encode(buf);
            }
            Self::Envelope(envelope) => {
                buf.write_str("ENVELOPE ");
                envelope.encode(buf);
            }
            Self::Flags(flags) => {
                buf.write_str("FLAGS ");
                paren_list(buf, flags);
            }
            Self::InternalDate(datetime) => {
                buf.write_str("INTERNALDATE ");
                datetime.encode(buf);
            }
            Self::Rfc822(data) => {
                buf.write_str("RFC822 ");
                buf.write_nstring(data);
            }
            Self::Rfc822Header(data) => {
                buf.write_str("RFC822.HEADER ");
                buf.write_nstring(data);
            }
            Self::Rfc822Size(size) => {
                buf.write_str("RFC822.SIZE ");
                buf.write_u32(*size);
            }
            Self::Rfc822Text(data) => {
                buf.write_str("RFC822.TEXT ");
                buf.write_nstring(data);
            }
            Self::Uid(uid) => {
                buf.write_str("UID ");
                uid.encode(buf);
            }
            Self::Binary { section, data } => {
                buf.write_str("BINARY[");
                join(buf, section, ".");
                buf.write_str("] ");
                buf.write_nstring(data);
            }
            Self::BinarySize { section, size } => {
                buf.write_str("BINARY.SIZE[");
                join(buf, section, ".");
                buf.write_str("] ");
                buf.write_u32(*size);
            }
            Self::ModSeq(value) => {
                buf.write_str("MODSEQ (");
                buf.write_u64(*value);
                buf.write_str(")");
            }
        }
    }
}

impl Encode for Envelope {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("(");
        buf.write_nstring(&self.date);
        buf.write_space();
        buf.write_nstring(&self.subject);
        buf.write_space();
        write_address_list(buf, &self.from);
        buf.write_space();
        write_address_list(buf, &self.sender);
        buf.write_space();
        write_address_list(buf, &self.reply_to);
        buf.write_space();
        write_address_list(buf, &self.to);
        buf.write_space();
        write_address_list(buf, &self.cc);
        buf.write_space();
        write_address_list(buf, &self.bcc);
        buf.write_space();
        buf.write_nstring(&self.in_reply_to);
        buf.write_space();
        buf.write_nstring(&self.message_id);
        buf.write_str(")");
    }
}

/// An empty address list is `NIL`, never `()`.
fn write_address_list(buf: &mut EncodeBuffer, addresses: &[Address]) {
    if addresses.is_empty() {
        buf.write_nil();
    } else {
        buf.write_str("(");
        for address in addresses {
            address.encode(buf);
        }
        buf.write_str(")");
    }
}

impl Encode for Address {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("(");
        buf.write_nstring(&self.name);
        buf.write_space();
        buf.write_nstring(&self.adl);
        buf.write_space();
        buf.write_nstring(&self.mailbox);
        buf.write_space();
        buf.write_nstring(&self.host);
        buf.write_str(")");
    }
}

impl Encode for BodyStructure {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str("(");
        match self {
            Self::Single {
                body,
                extension_data,
            } => {
                body.encode(buf);
                if let Some(extension_data) = extension_data {
                    buf.write_space();
                    extension_data.encode(buf);
                }
            }
            Self::Multi {
                bodies,
                subtype,
                extension_data,
            } => {
                for body in bodies {
                    body.encode(buf);
                }
                buf.write_space();
                subtype.encode(buf);
                if let Some(extension_data) = extension_data {
                    buf.write_space();
                    extension_data.encode(buf);
                }
            }
        }
        buf.write_str(")");
    }
}

impl Encode for Body {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match &self.specific {
            SpecificFields::Basic { r#type, subtype } => {
                r#type.encode(buf);
                buf.write_space();
                subtype.encode(buf);
                buf.write_space();
                self.basic.encode(buf);
            }
            SpecificFields::Message {
                envelope,
                body_structure,
                number_of_lines,
            } => {
                buf.write_str("\"MESSAGE\" \"RFC822\" ");
                self.basic.encode(buf);
                buf.write_space();
                envelope.encode(buf);
                buf.write_space();
                body_structure.encode(buf);
                buf.write_space();
                buf.write_u32(*number_of_lines);
            }
            SpecificFields::Text {
                subtype,
                number_of_lines,
            } => {
                buf.write_str("\"TEXT\" ");
                subtype.encode(buf);
                buf.write_space();
                self.basic.encode(buf);
                buf.write_space();
                buf.write_u32(*number_of_lines);
            }
        }
    }
}

impl Encode for BasicFields {
    fn encode(&self, buf: &mut EncodeBuffer) {
        write_parameter_list(buf, &self.parameter_list);
        buf.write_space();
        buf.write_nstring(&self.id);
        buf.write_space();
        buf.write_nstring(&self.description);
        buf.write_space();
        self.content_transfer_encoding.encode(buf);
        buf.write_space();
        buf.write_u32(self.octets);
    }
}

fn write_parameter_list(buf: &mut EncodeBuffer, parameters: &[(IString, IString)]) {
    if parameters.is_empty() {
        buf.write_nil();
        return;
    }

    buf.write_str("(");
    for (index, (key, value)) in parameters.iter().enumerate() {
        if index > 0 {
            buf.write_space();
        }
        key.encode(buf);
        buf.write_space();
        value.encode(buf);
    }
    buf.write_str(")");
}

impl Encode for SinglePartExtension {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_nstring(&self.md5);
        if let Some(tail) = &self.tail {
            buf.write_space();
            tail.encode(buf);
        }
    }
}

impl Encode for MultiPartExtension {
    fn encode(&self, buf: &mut EncodeBuffer) {
        write_parameter_list(buf, &self.parameter_list);
        if let Some(tail) = &self.tail {
            buf.write_space();
            tail.encode(buf);
        }
    }
}

impl Encode for Disposition {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match &self.disposition {
            Some((disposition, parameters)) => {
                buf.write_str("(");
                disposition.encode(buf);
                buf.write_space();
                write_parameter_list(buf, parameters);
                buf.write_str(")");
            }
            None => buf.write_nil(),
        }

        if let Some(tail) = &self.tail {
            buf.write_space();
            tail.encode(buf);
        }
    }
}

impl Encode for Language {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self.languages.as_slice() {
            [] => buf.write_nil(),
            [single] => single.encode(buf),
            many => paren_list(buf, many),
        }

        if let Some(tail) = &self.tail {
            buf.write_space();
            tail.encode(buf);
        }
    }
}

impl Encode for Location {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_nstring(&self.location);
        for extension in &self.extensions {
            buf.write_space();
            extension.encode(buf);
        }
    }
}

impl Encode for BodyExtension {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::NString(value) => buf.write_nstring(value),
            Self::Number(value) => buf.write_u32(*value),
            Self::List(values) => paren_list(buf, values.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{
        core::{NString, NonEmptyVec},
        testing::encodes_to_server,
        types::flag::FlagFetch,
    };

    #[test]
    fn test_empty_address_list_is_nil() {
        encodes_to_server(
            &Envelope::default(),
            b"(NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL)",
        );
    }

    #[test]
    fn test_status_response_keeps_parentheses() {
        let data = Data::Status {
            mailbox: crate::types::mailbox::Mailbox::Inbox,
            items: vec![StatusDataItem::Messages(231)],
        };

        encodes_to_server(&data, b"* STATUS \"INBOX\" (MESSAGES 231)\r\n");
    }

    #[test]
    fn test_fetch_response() {
        let data = Data::Fetch {
            seq: NonZeroU32::new(12).unwrap(),
            items: NonEmptyVec::try_from(vec![
                MessageDataItem::Flags(vec![
                    FlagFetch::Flag(crate::types::flag::Flag::Seen),
                    FlagFetch::Recent,
                ]),
                MessageDataItem::Rfc822Size(44827),
            ])
            .unwrap(),
        };

        encodes_to_server(
            &data,
            b"* 12 FETCH (FLAGS (\\Seen \\Recent) RFC822.SIZE 44827)\r\n",
        );
    }

    #[test]
    fn test_esearch_response() {
        let data = Data::ExtendedSearch(ExtendedSearchData {
            correlator: Some(crate::core::Tag::try_from("A285").unwrap()),
            uid: true,
            returns: vec![
                SearchReturnData::Min(NonZeroU32::new(2).unwrap()),
                SearchReturnData::Count(3),
                SearchReturnData::All("2,10:11".parse().unwrap()),
            ],
        });

        encodes_to_server(
            &data,
            b"* ESEARCH (TAG \"A285\") UID MIN 2 COUNT 3 ALL 2,10:11\r\n",
        );
    }

    #[test]
    fn test_modseq_fetch_item() {
        encodes_to_server(&MessageDataItem::ModSeq(624140003), b"MODSEQ (624140003)");
    }

    #[test]
    fn test_body_ext_with_origin() {
        encodes_to_server(
            &MessageDataItem::BodyExt {
                section: None,
                origin: Some(42),
                data: NString::from("xxx"),
            },
            b"BODY[]<42> \"xxx\"",
        );
    }
}
