//! Encoding of messages into wire bytes.
//!
//! All string-form decisions (atom vs quoted vs literal vs binary literal)
//! are made in one place, [`EncodeBuffer::write_imap_string`], so every
//! producer of a string gets identical behavior.
//!
//! An [`EncodeBuffer`] in client-sync mode yields a *sequence of chunks*:
//! every synchronizing literal ends the current chunk right after its
//! `{n}\r\n` header, because the client must wait for a continuation
//! request before transmitting the literal bytes. Server mode yields a
//! single chunk; a server never waits.
//!
//! ```rust
//! use imap_wire::{
//!     encode::encode_command,
//!     types::capability::Capabilities,
//!     types::command::{Command, CommandBody},
//! };
//!
//! let command = Command::new("A1", CommandBody::login("alice", "pa ss")).unwrap();
//! let encoded = encode_command(&command, &Capabilities::new());
//!
//! assert_eq!(encoded.dump(), b"A1 LOGIN \"alice\" \"pa ss\"\r\n");
//! ```

mod command;
mod response;

use std::{collections::VecDeque, mem};

use crate::{
    core::{Atom, Charset, IString, NString, QuotedChar, Tag, Text},
    types::{
        capability::{Capabilities, Capability},
        command::{Command, IdleDone},
        datetime::{DateTime, NaiveDate, MONTHS},
        fetch::{Part, Section},
        flag::{Flag, FlagFetch, FlagNameAttribute, FlagPerm},
        mailbox::{ListMailbox, Mailbox},
        metadata::MetadataEntry,
        response::{Greeting, Response},
        sequence::{SeqOrUid, Sequence, SequenceSet},
        TaggedExtValue, TaggedExtension,
    },
    utils::{escape_quoted, indicators::is_list_char},
};

use chrono::{Datelike, Timelike};

/// Whether the buffer belongs to a client (which must synchronize on
/// literals) or a server (which never waits).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodeMode {
    Server,
    ClientSync,
}

/// A growable byte writer producing one or more wire chunks.
#[derive(Clone, Debug)]
pub struct EncodeBuffer {
    mode: EncodeMode,
    capabilities: Capabilities,
    chunks: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl EncodeBuffer {
    /// A buffer for client-to-server traffic, synchronizing on literals
    /// unless `capabilities` allows the non-synchronizing form.
    pub fn client(capabilities: Capabilities) -> Self {
        Self {
            mode: EncodeMode::ClientSync,
            capabilities,
            chunks: Vec::new(),
            current: Vec::new(),
        }
    }

    /// A buffer for server-to-client traffic: a single flat chunk.
    pub fn server() -> Self {
        Self {
            mode: EncodeMode::Server,
            capabilities: Capabilities::new(),
            chunks: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn mode(&self) -> EncodeMode {
        self.mode
    }

    pub(crate) fn write_str(&mut self, value: &str) {
        self.current.extend_from_slice(value.as_bytes());
    }

    pub(crate) fn write_bytes(&mut self, value: &[u8]) {
        self.current.extend_from_slice(value);
    }

    pub(crate) fn write_u32(&mut self, value: u32) {
        self.write_str(&value.to_string());
    }

    pub(crate) fn write_u64(&mut self, value: u64) {
        self.write_str(&value.to_string());
    }

    pub(crate) fn write_space(&mut self) {
        self.write_str(" ");
    }

    pub(crate) fn write_nil(&mut self) {
        self.write_str("NIL");
    }

    /// Emit a string payload in its canonical wire form.
    ///
    /// Quoted iff every byte is a quoted-char (7-bit, no CR/LF/NUL); binary
    /// literal iff the payload contains NUL; otherwise a literal whose
    /// synchronization is decided by the peer capabilities.
    ///
    /// # Panics
    ///
    /// Panics when the payload contains NUL, the mode is client-sync, and
    /// the peer has not advertised `BINARY`. This is a type-discipline
    /// boundary, not a wire-input error.
    pub fn write_imap_string(&mut self, bytes: &[u8]) {
        if bytes
            .iter()
            .all(|b| matches!(*b, 0x01..=0x7f) && *b != b'\r' && *b != b'\n')
        {
            self.write_quoted(bytes);
        } else if bytes.contains(&0x00) {
            self.write_literal8(bytes);
        } else {
            self.write_literal(bytes);
        }
    }

    /// `NIL` when absent, otherwise [`EncodeBuffer::write_imap_string`].
    pub fn write_nstring(&mut self, value: &NString) {
        match &value.0 {
            Some(string) => self.write_imap_string(string.as_bytes()),
            None => self.write_nil(),
        }
    }

    fn write_quoted(&mut self, bytes: &[u8]) {
        // Quotability was checked by the caller; quoted-chars are ASCII.
        let value = std::str::from_utf8(bytes).unwrap();
        self.write_str("\"");
        self.write_str(&escape_quoted(value));
        self.write_str("\"");
    }

    /// Force the (non-quoted) literal rendering.
    pub fn write_literal(&mut self, bytes: &[u8]) {
        self.write_literal_inner(bytes, false);
    }

    /// Force the binary literal rendering (`~{n}`).
    ///
    /// # Panics
    ///
    /// See [`EncodeBuffer::write_imap_string`].
    pub fn write_literal8(&mut self, bytes: &[u8]) {
        assert!(
            self.mode == EncodeMode::Server || self.capabilities.binary(),
            "binary literal requires the peer to have advertised BINARY",
        );
        self.write_literal_inner(bytes, true);
    }

    fn write_literal_inner(&mut self, bytes: &[u8], binary: bool) {
        if binary {
            self.write_str("~");
        }

        match self.mode {
            EncodeMode::Server => {
                // A server sends the payload immediately after the header.
                self.write_str(&format!("{{{}}}\r\n", bytes.len()));
                self.write_bytes(bytes);
            }
            EncodeMode::ClientSync => {
                let non_sync = self.capabilities.literal_plus()
                    || (self.capabilities.literal_minus() && bytes.len() <= 4096);

                if non_sync {
                    self.write_str(&format!("{{{}+}}\r\n", bytes.len()));
                    self.write_bytes(bytes);
                } else {
                    // The chunk ends after the header; the payload opens the
                    // next chunk once the continuation request arrived.
                    self.write_str(&format!("{{{}}}\r\n", bytes.len()));
                    self.chunks.push(mem::take(&mut self.current));
                    self.write_bytes(bytes);
                }
            }
        }
    }

    pub fn finish(mut self) -> Encoded {
        if !self.current.is_empty() || self.chunks.is_empty() {
            let last = mem::take(&mut self.current);
            self.chunks.push(last);
        }

        Encoded {
            chunks: self.chunks.into(),
        }
    }
}

/// The chunk sequence produced by one encoding operation.
///
/// In client-sync mode the transport must await a command continuation
/// request between consecutive chunks; server-mode output is one chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encoded {
    chunks: VecDeque<Vec<u8>>,
}

impl Encoded {
    /// Concatenate the remaining chunks, ignoring continuation handling.
    pub fn dump(self) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        out
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl Iterator for Encoded {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.pop_front()
    }
}

/// Serialization of one AST family into an [`EncodeBuffer`].
pub trait Encode {
    fn encode(&self, buf: &mut EncodeBuffer);
}

/// Encode a command in client-sync mode against the given capabilities.
pub fn encode_command(command: &Command, capabilities: &Capabilities) -> Encoded {
    let mut buf = EncodeBuffer::client(capabilities.clone());
    command.encode(&mut buf);
    buf.finish()
}

/// Encode the IDLE `DONE` line.
pub fn encode_idle_done() -> Encoded {
    let mut buf = EncodeBuffer::client(Capabilities::new());
    IdleDone.encode(&mut buf);
    buf.finish()
}

/// Encode a response in server mode.
pub fn encode_response(response: &Response) -> Encoded {
    let mut buf = EncodeBuffer::server();
    response.encode(&mut buf);
    buf.finish()
}

/// Encode a greeting in server mode.
pub fn encode_greeting(greeting: &Greeting) -> Encoded {
    let mut buf = EncodeBuffer::server();
    greeting.encode(&mut buf);
    buf.finish()
}

pub(crate) fn join<T: Encode>(buf: &mut EncodeBuffer, items: &[T], sep: &str) {
    if let Some((head, tail)) = items.split_first() {
        head.encode(buf);
        for item in tail {
            buf.write_str(sep);
            item.encode(buf);
        }
    }
}

pub(crate) fn paren_list<T: Encode>(buf: &mut EncodeBuffer, items: &[T]) {
    buf.write_str("(");
    join(buf, items, " ");
    buf.write_str(")");
}

// ----- Shared primitives --------------------------------------------------

impl Encode for u32 {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_u32(*self);
    }
}

impl Encode for u64 {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_u64(*self);
    }
}

impl Encode for std::num::NonZeroU32 {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_u32(self.get());
    }
}

impl Encode for Tag {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(self.inner());
    }
}

impl Encode for Atom {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(self.inner());
    }
}

impl Encode for Text {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(self.inner());
    }
}

impl Encode for IString {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_imap_string(self.as_bytes());
    }
}

impl Encode for NString {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_nstring(self);
    }
}

impl Encode for Charset {
    fn encode(&self, buf: &mut EncodeBuffer) {
        if Atom::verify(self.inner()).is_ok() {
            buf.write_str(self.inner());
        } else {
            buf.write_str("\"");
            buf.write_str(&escape_quoted(self.inner()));
            buf.write_str("\"");
        }
    }
}

impl Encode for QuotedChar {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self.inner() {
            c @ ('"' | '\\') => buf.write_str(&format!("\"\\{c}\"")),
            c => buf.write_str(&format!("\"{c}\"")),
        }
    }
}

impl Encode for Capability {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(&self.to_string());
    }
}

impl Encode for Mailbox {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_imap_string(self.as_bytes());
    }
}

impl Encode for ListMailbox {
    fn encode(&self, buf: &mut EncodeBuffer) {
        let bytes = self.as_bytes();

        // A non-empty all-list-char pattern is emitted as a bare token,
        // which keeps `LIST "" *` in its familiar shape.
        if !bytes.is_empty() && bytes.iter().all(|b| is_list_char(*b)) {
            buf.write_bytes(bytes);
        } else {
            buf.write_imap_string(bytes);
        }
    }
}

impl Encode for MetadataEntry {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_imap_string(self.as_bytes());
    }
}

impl Encode for Flag {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(&self.to_string());
    }
}

impl Encode for FlagFetch {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Flag(flag) => flag.encode(buf),
            Self::Recent => buf.write_str("\\Recent"),
        }
    }
}

impl Encode for FlagPerm {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Flag(flag) => flag.encode(buf),
            Self::Asterisk => buf.write_str("\\*"),
        }
    }
}

impl Encode for FlagNameAttribute {
    fn encode(&self, buf: &mut EncodeBuffer) {
        buf.write_str(&self.to_string());
    }
}

impl Encode for SeqOrUid {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Value(value) => buf.write_u32(value.get()),
            Self::Asterisk => buf.write_str("*"),
        }
    }
}

impl Encode for Sequence {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Single(value) => value.encode(buf),
            // A degenerate range is canonically a single number.
            Self::Range(lo, hi) if lo == hi => lo.encode(buf),
            Self::Range(lo, hi) => {
                lo.encode(buf);
                buf.write_str(":");
                hi.encode(buf);
            }
        }
    }
}

impl Encode for SequenceSet {
    fn encode(&self, buf: &mut EncodeBuffer) {
        join(buf, self.0.as_ref(), ",");
    }
}

impl Encode for DateTime {
    fn encode(&self, buf: &mut EncodeBuffer) {
        let inner = self.as_ref();
        let offset = inner.offset().local_minus_utc();
        let (sign, abs) = if offset < 0 { ('-', -offset) } else { ('+', offset) };

        buf.write_str(&format!(
            "\"{:>2}-{}-{:04} {:02}:{:02}:{:02} {}{:02}{:02}\"",
            inner.day(),
            MONTHS[inner.month0() as usize],
            inner.year(),
            inner.hour(),
            inner.minute(),
            inner.second(),
            sign,
            abs / 3600,
            (abs % 3600) / 60,
        ));
    }
}

impl Encode for NaiveDate {
    fn encode(&self, buf: &mut EncodeBuffer) {
        let inner = self.as_ref();
        buf.write_str(&format!(
            "{}-{}-{:04}",
            inner.day(),
            MONTHS[inner.month0() as usize],
            inner.year(),
        ));
    }
}

impl Encode for Part {
    fn encode(&self, buf: &mut EncodeBuffer) {
        join(buf, self.0.as_ref(), ".");
    }
}

impl Encode for Section {
    fn encode(&self, buf: &mut EncodeBuffer) {
        fn prefix(buf: &mut EncodeBuffer, part: &Option<Part>) {
            if let Some(part) = part {
                part.encode(buf);
                buf.write_str(".");
            }
        }

        match self {
            Self::Part(part) => part.encode(buf),
            Self::Header(part) => {
                prefix(buf, part);
                buf.write_str("HEADER");
            }
            Self::HeaderFields(part, fields) => {
                prefix(buf, part);
                buf.write_str("HEADER.FIELDS ");
                paren_list(buf, fields.as_ref());
            }
            Self::HeaderFieldsNot(part, fields) => {
                prefix(buf, part);
                buf.write_str("HEADER.FIELDS.NOT ");
                paren_list(buf, fields.as_ref());
            }
            Self::Text(part) => {
                prefix(buf, part);
                buf.write_str("TEXT");
            }
            Self::Mime(part) => {
                part.encode(buf);
                buf.write_str(".MIME");
            }
        }
    }
}

impl Encode for TaggedExtension {
    fn encode(&self, buf: &mut EncodeBuffer) {
        self.label.encode(buf);
        if let Some(value) = &self.value {
            buf.write_space();
            value.encode(buf);
        }
    }
}

impl Encode for TaggedExtValue {
    fn encode(&self, buf: &mut EncodeBuffer) {
        match self {
            Self::Sequence(set) => set.encode(buf),
            Self::Number(number) => buf.write_u64(*number),
            Self::String(string) => string.encode(buf),
            Self::List(values) => paren_list(buf, values),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;
    use crate::testing::encodes_to_server;

    #[test]
    fn test_imap_string_forms() {
        let mut buf = EncodeBuffer::server();
        buf.write_imap_string(b"plain");
        buf.write_space();
        buf.write_imap_string(b"two words");
        buf.write_space();
        buf.write_imap_string(b"say \"hi\"");
        buf.write_space();
        buf.write_imap_string(b"line\r\nbreak");
        assert_eq!(
            buf.finish().dump(),
            b"\"plain\" \"two words\" \"say \\\"hi\\\"\" {11}\r\nline\r\nbreak".to_vec(),
        );
    }

    #[test]
    fn test_client_sync_literal_breaks_chunk() {
        let mut buf = EncodeBuffer::client(Capabilities::new());
        buf.write_str("A APPEND ");
        buf.write_literal(b"hello");
        buf.write_str("\r\n");

        let chunks: Vec<Vec<u8>> = buf.finish().collect();
        assert_eq!(
            chunks,
            vec![b"A APPEND {5}\r\n".to_vec(), b"hello\r\n".to_vec()],
        );
    }

    #[test]
    fn test_literal_plus_keeps_single_chunk() {
        let caps = Capabilities::from_iter([Capability::LiteralPlus]);
        let mut buf = EncodeBuffer::client(caps);
        buf.write_literal(b"hello");

        let chunks: Vec<Vec<u8>> = buf.finish().collect();
        assert_eq!(chunks, vec![b"{5+}\r\nhello".to_vec()]);
    }

    #[test]
    fn test_literal_minus_limits_non_sync_to_4096() {
        let caps = Capabilities::from_iter([Capability::LiteralMinus]);

        let mut buf = EncodeBuffer::client(caps.clone());
        buf.write_literal(&vec![b'x'; 4096]);
        assert_eq!(buf.finish().chunk_count(), 1);

        let mut buf = EncodeBuffer::client(caps);
        buf.write_literal(&vec![b'x'; 4097]);
        assert_eq!(buf.finish().chunk_count(), 2);
    }

    #[test]
    #[should_panic(expected = "BINARY")]
    fn test_binary_literal_without_capability_panics() {
        let mut buf = EncodeBuffer::client(Capabilities::new());
        buf.write_imap_string(b"nul\x00byte");
    }

    #[test]
    fn test_binary_literal_in_server_mode() {
        let mut buf = EncodeBuffer::server();
        buf.write_imap_string(b"nul\x00byte");
        assert_eq!(buf.finish().dump(), b"~{8}\r\nnul\x00byte".to_vec());
    }

    #[test]
    fn test_sequence_canonicalization() {
        use std::num::NonZeroU32;

        let n = |v: u32| SeqOrUid::Value(NonZeroU32::new(v).unwrap());

        encodes_to_server(&Sequence::Range(n(5), n(5)), b"5");
        encodes_to_server(&Sequence::Range(n(1), n(4)), b"1:4");
        encodes_to_server(&Sequence::Range(n(10), SeqOrUid::Asterisk), b"10:*");
    }

    #[test]
    fn test_date_time_zone_padding() {
        let east = FixedOffset::east_opt(2 * 3600 + 30 * 60).unwrap();
        let dt = DateTime::try_from(east.with_ymd_and_hms(1994, 2, 7, 21, 52, 25).unwrap()).unwrap();
        encodes_to_server(&dt, b"\" 7-Feb-1994 21:52:25 +0230\"");

        let west = FixedOffset::west_opt(3 * 3600).unwrap();
        let dt = DateTime::try_from(west.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()).unwrap();
        encodes_to_server(&dt, b"\"31-Dec-2024 00:00:00 -0300\"");
    }

    #[test]
    fn test_list_mailbox_token_form() {
        encodes_to_server(&ListMailbox::try_from("*").unwrap(), b"*");
        encodes_to_server(&ListMailbox::try_from("%").unwrap(), b"%");
        encodes_to_server(&ListMailbox::try_from("").unwrap(), b"\"\"");
        encodes_to_server(&ListMailbox::try_from("a b").unwrap(), b"\"a b\"");
    }
}
