//! Byte-to-message processors and the outbound chunk gate.
//!
//! [`ResponseStream`] and [`CommandStream`] wrap the parsers in a
//! consumption loop: bytes go in via `feed`, AST events come out of
//! `next_event`. `Ok(None)` means "need more data"; a terminal error is
//! reported once, with a copy of the offending buffer, and the stream stays
//! failed.
//!
//! FETCH body payloads (and APPEND payloads on the command side) are never
//! buffered: the streams emit a header event carrying the byte count and
//! then hand out the payload as raw chunks, keeping memory O(1) in the
//! literal size.
//!
//! [`Outbound`] is the client-side dual: it encodes
//! [`CommandStreamPart`]s into chunk sequences and releases the next chunk
//! only after the continuation request for the previous one arrived.

use std::{collections::VecDeque, mem, num::NonZeroU32};

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, opt, peek, value},
    sequence::{preceded, terminated, tuple},
};
use thiserror::Error;

use crate::{
    core::{NString, Tag},
    encode::{encode_command, encode_idle_done, Encoded},
    framing::FrameScanner,
    parse::{
        command::{command, idle_done},
        core::{crlf, literal_header, nz_number, sp, tag_imap},
        fetch::{msg_att_item, origin, section, section_binary},
        flag::flag_list,
        into_decode_error,
        mailbox::mailbox,
        response::response,
        DecodeError, WireResult,
    },
    types::{
        capability::Capabilities,
        command::Command,
        datetime::DateTime,
        fetch::{MessageDataItem, Section},
        flag::Flag,
        mailbox::Mailbox,
        response::Response,
    },
};

/// Default cap on the bytes an unfinished message may occupy (1 MiB).
pub const DEFAULT_BUFFER_LIMIT: usize = 1024 * 1024;

/// A terminal decoder failure, carrying a copy of the unconsumed buffer.
/// The original buffer stays with the transport.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("decoder failed: {error}")]
pub struct StreamError {
    pub error: DecodeError,
    pub buffer: Vec<u8>,
}

// ----- response stream ----------------------------------------------------

/// An AST fragment produced by [`ResponseStream`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponseEvent {
    /// A complete non-FETCH response.
    Response(Response),
    /// `* n FETCH (` was consumed; item events follow.
    FetchBegin { seq: NonZeroU32 },
    /// A complete (non-streamed) data item of the current FETCH.
    FetchItem(MessageDataItem),
    /// A body payload of `length` bytes follows as [`ResponseEvent::BodyChunk`]s.
    BodyHeader { item: StreamedItem, length: u32 },
    BodyChunk(Vec<u8>),
    /// The closing `)` CRLF of the current FETCH.
    FetchEnd,
}

/// Which FETCH attribute a streamed payload belongs to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamedItem {
    BodySection {
        section: Option<Section>,
        origin: Option<u32>,
    },
    Rfc822,
    Rfc822Header,
    Rfc822Text,
    Binary {
        section: Vec<NonZeroU32>,
    },
}

#[derive(Clone, Copy, Debug)]
enum RespState {
    Line,
    InFetch { first: bool },
    Body { remaining: u32 },
}

/// Incremental decoder for the server-to-client direction.
#[derive(Debug)]
pub struct ResponseStream {
    buffer: Vec<u8>,
    consumed: usize,
    state: RespState,
    limit: usize,
    failed: Option<StreamError>,
}

impl Default for ResponseStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStream {
    pub fn new() -> Self {
        Self::with_buffer_limit(DEFAULT_BUFFER_LIMIT)
    }

    pub fn with_buffer_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            consumed: 0,
            state: RespState::Line,
            limit,
            failed: None,
        }
    }

    /// Append transport bytes. The writer side of the buffer never moves
    /// during a parse call.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Produce the next event, or `Ok(None)` when more bytes are needed.
    pub fn next_event(&mut self) -> Result<Option<ResponseEvent>, StreamError> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }

        self.compact();

        loop {
            match self.state {
                RespState::Line => {
                    let input = &self.buffer[self.consumed..];
                    if input.is_empty() {
                        return Ok(None);
                    }

                    match fetch_begin(input) {
                        Ok((remaining, seq)) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.state = RespState::InFetch { first: true };
                            return Ok(Some(ResponseEvent::FetchBegin { seq }));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(_) => {}
                    }

                    let input = &self.buffer[self.consumed..];
                    match response(input) {
                        Ok((remaining, response)) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            log::trace!("decoded response ({used} bytes)");
                            return Ok(Some(ResponseEvent::Response(response)));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(error) => return self.fail(into_decode_error(input.len(), error)),
                    }
                }
                RespState::InFetch { first } => {
                    let input = &self.buffer[self.consumed..];
                    if input.is_empty() {
                        return Ok(None);
                    }

                    let (skip, item_input) = if first {
                        (0, input)
                    } else if input[0] == b')' {
                        if input.len() < 3 {
                            return if input.starts_with(b")\r") || input.len() == 1 {
                                self.need_more()
                            } else {
                                self.fail(DecodeError::Parse {
                                    position: 1,
                                    expected: "CRLF",
                                })
                            };
                        }
                        if &input[..3] != b")\r\n" {
                            return self.fail(DecodeError::Parse {
                                position: 1,
                                expected: "CRLF",
                            });
                        }
                        self.advance(3);
                        self.state = RespState::Line;
                        return Ok(Some(ResponseEvent::FetchEnd));
                    } else if input[0] == b' ' {
                        (1, &input[1..])
                    } else {
                        return self.fail(DecodeError::Parse {
                            position: 0,
                            expected: "SP or )",
                        });
                    };

                    match msg_att_stream(item_input) {
                        Ok((remaining, StreamAtt::Complete(item))) => {
                            let used = skip + item_input.len() - remaining.len();
                            self.advance(used);
                            self.state = RespState::InFetch { first: false };
                            return Ok(Some(ResponseEvent::FetchItem(item)));
                        }
                        Ok((remaining, StreamAtt::Streamed { item, length })) => {
                            let used = skip + item_input.len() - remaining.len();
                            self.advance(used);
                            self.state = RespState::Body { remaining: length };
                            return Ok(Some(ResponseEvent::BodyHeader { item, length }));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(error) => {
                            return self.fail(into_decode_error(item_input.len(), error))
                        }
                    }
                }
                RespState::Body { remaining } => {
                    if remaining == 0 {
                        self.state = RespState::InFetch { first: false };
                        continue;
                    }

                    let available = self.buffer.len() - self.consumed;
                    if available == 0 {
                        return Ok(None);
                    }

                    let take = (remaining as usize).min(available);
                    let chunk = self.buffer[self.consumed..self.consumed + take].to_vec();
                    self.advance(take);
                    self.state = RespState::Body {
                        remaining: remaining - take as u32,
                    };
                    return Ok(Some(ResponseEvent::BodyChunk(chunk)));
                }
            }
        }
    }

    fn advance(&mut self, count: usize) {
        self.consumed += count;
    }

    fn compact(&mut self) {
        if self.consumed == self.buffer.len() {
            self.buffer.clear();
            self.consumed = 0;
        } else if self.consumed > 4096 {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
    }

    fn need_more(&mut self) -> Result<Option<ResponseEvent>, StreamError> {
        if self.buffer.len() - self.consumed > self.limit {
            return self.fail(DecodeError::BufferLimitExceeded { limit: self.limit });
        }

        Ok(None)
    }

    fn fail<T>(&mut self, error: DecodeError) -> Result<Option<T>, StreamError> {
        let error = StreamError {
            error,
            buffer: self.buffer[self.consumed..].to_vec(),
        };
        log::warn!("response decoder failed: {}", error.error);
        self.failed = Some(error.clone());
        Err(error)
    }
}

/// `"*" SP nz-number SP "FETCH" SP "("`
fn fetch_begin(input: &[u8]) -> WireResult<NonZeroU32> {
    map(
        tuple((
            tag(b"* "),
            nz_number,
            sp,
            tag_no_case(b"FETCH"),
            sp,
            tag(b"("),
        )),
        |(_, seq, _, _, _, _)| seq,
    )(input)
}

enum StreamAtt {
    Complete(MessageDataItem),
    Streamed { item: StreamedItem, length: u32 },
}

enum StreamValue {
    Literal(u32),
    Inline(NString),
}

/// The value position of a streamable attribute: a literal header (to be
/// streamed) or an inline nstring.
fn stream_value(input: &[u8]) -> WireResult<StreamValue> {
    alt((
        map(literal_header, |header| StreamValue::Literal(header.length)),
        map(crate::parse::core::nstring, StreamValue::Inline),
    ))(input)
}

/// One FETCH attribute, with body-valued literals left unconsumed.
fn msg_att_stream(input: &[u8]) -> WireResult<StreamAtt> {
    alt((
        // BODY[section]<origin> value
        |input| {
            let (remaining, (_, section, origin, _, value)) = tuple((
                tag_no_case(b"BODY"),
                section,
                opt(origin),
                sp,
                stream_value,
            ))(input)?;

            Ok((
                remaining,
                match value {
                    StreamValue::Literal(length) => StreamAtt::Streamed {
                        item: StreamedItem::BodySection { section, origin },
                        length,
                    },
                    StreamValue::Inline(data) => StreamAtt::Complete(MessageDataItem::BodyExt {
                        section,
                        origin,
                        data,
                    }),
                },
            ))
        },
        // RFC822[.HEADER/.TEXT] value -- but not RFC822.SIZE
        |input| {
            let (remaining, (item, _, value)) = tuple((
                preceded(
                    tag_no_case(b"RFC822"),
                    alt((
                        value(StreamedItem::Rfc822Header, tag_no_case(b".HEADER")),
                        value(StreamedItem::Rfc822Text, tag_no_case(b".TEXT")),
                        value(StreamedItem::Rfc822, peek(tag(b" "))),
                    )),
                ),
                sp,
                stream_value,
            ))(input)?;

            Ok((
                remaining,
                match value {
                    StreamValue::Literal(length) => StreamAtt::Streamed { item, length },
                    StreamValue::Inline(data) => StreamAtt::Complete(match item {
                        StreamedItem::Rfc822 => MessageDataItem::Rfc822(data),
                        StreamedItem::Rfc822Header => MessageDataItem::Rfc822Header(data),
                        StreamedItem::Rfc822Text => MessageDataItem::Rfc822Text(data),
                        _ => unreachable!(),
                    }),
                },
            ))
        },
        // BINARY[part] value -- but not BINARY.SIZE
        |input| {
            let (remaining, (_, section, _, value)) = tuple((
                tag_no_case(b"BINARY"),
                section_binary,
                sp,
                stream_value,
            ))(input)?;

            Ok((
                remaining,
                match value {
                    StreamValue::Literal(length) => StreamAtt::Streamed {
                        item: StreamedItem::Binary { section },
                        length,
                    },
                    StreamValue::Inline(data) => {
                        StreamAtt::Complete(MessageDataItem::Binary { section, data })
                    }
                },
            ))
        },
        map(msg_att_item, StreamAtt::Complete),
    ))(input)
}

// ----- command stream -----------------------------------------------------

/// An AST fragment produced by [`CommandStream`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandEvent {
    /// A complete command (anything but APPEND).
    Command(Command),
    /// `tag APPEND mailbox` was consumed; message events follow.
    AppendBegin { tag: Tag, mailbox: Mailbox },
    /// One message of the APPEND; `length` payload bytes follow as
    /// [`CommandEvent::AppendChunk`]s.
    AppendMessage {
        flags: Vec<Flag>,
        date: Option<DateTime>,
        length: u32,
        binary: bool,
    },
    AppendChunk(Vec<u8>),
    /// The CRLF finishing the APPEND.
    AppendEnd,
    /// The `DONE` line finishing an IDLE.
    IdleDone,
}

#[derive(Clone, Copy, Debug)]
enum CmdState {
    Line,
    AppendNext,
    AppendData { remaining: u32 },
    ExpectIdleDone,
}

/// Incremental decoder for the client-to-server direction.
///
/// Owns a [`FrameScanner`]; after each `feed` the host should drain
/// [`CommandStream::take_pending_continuations`] and send one `+ OK` per
/// counted synchronizing literal.
#[derive(Debug)]
pub struct CommandStream {
    buffer: Vec<u8>,
    consumed: usize,
    state: CmdState,
    limit: usize,
    failed: Option<StreamError>,
    scanner: FrameScanner,
    pending_continuations: usize,
    total_consumed: u64,
}

impl Default for CommandStream {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStream {
    pub fn new() -> Self {
        Self::with_buffer_limit(DEFAULT_BUFFER_LIMIT)
    }

    pub fn with_buffer_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            consumed: 0,
            state: CmdState::Line,
            limit,
            failed: None,
            scanner: FrameScanner::new(),
            pending_continuations: 0,
            total_consumed: 0,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        let framing = self.scanner.scan(bytes);
        self.pending_continuations += framing.synchronizing_literals;
        self.buffer.extend_from_slice(bytes);
    }

    /// How many `+ OK` continuation requests the host owes the client.
    /// Resets the counter.
    pub fn take_pending_continuations(&mut self) -> usize {
        mem::take(&mut self.pending_continuations)
    }

    /// Switch to expecting the IDLE `DONE` line. Must be called by the
    /// session after it accepted an IDLE command.
    pub fn expect_idle_done(&mut self) {
        self.state = CmdState::ExpectIdleDone;
    }

    pub fn next_event(&mut self) -> Result<Option<CommandEvent>, StreamError> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }

        self.compact();

        loop {
            match self.state {
                CmdState::Line => {
                    let input = &self.buffer[self.consumed..];
                    if input.is_empty() {
                        return Ok(None);
                    }

                    match append_begin(input) {
                        Ok((remaining, (tag, mailbox))) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.state = CmdState::AppendNext;
                            return Ok(Some(CommandEvent::AppendBegin { tag, mailbox }));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(_) => {}
                    }

                    let input = &self.buffer[self.consumed..];
                    match command(input) {
                        Ok((remaining, command)) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.assert_framing();
                            return Ok(Some(CommandEvent::Command(command)));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(error) => return self.fail(into_decode_error(input.len(), error)),
                    }
                }
                CmdState::AppendNext => {
                    let input = &self.buffer[self.consumed..];
                    if input.is_empty() {
                        return Ok(None);
                    }

                    match crlf(input) {
                        Ok((remaining, _)) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.state = CmdState::Line;
                            self.assert_framing();
                            return Ok(Some(CommandEvent::AppendEnd));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(_) => {}
                    }

                    match append_message_header(input) {
                        Ok((remaining, (flags, date, length, binary))) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.state = CmdState::AppendData { remaining: length };
                            return Ok(Some(CommandEvent::AppendMessage {
                                flags,
                                date,
                                length,
                                binary,
                            }));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(error) => return self.fail(into_decode_error(input.len(), error)),
                    }
                }
                CmdState::AppendData { remaining } => {
                    if remaining == 0 {
                        self.state = CmdState::AppendNext;
                        continue;
                    }

                    let available = self.buffer.len() - self.consumed;
                    if available == 0 {
                        return Ok(None);
                    }

                    let take = (remaining as usize).min(available);
                    let chunk = self.buffer[self.consumed..self.consumed + take].to_vec();
                    self.advance(take);
                    self.state = CmdState::AppendData {
                        remaining: remaining - take as u32,
                    };
                    return Ok(Some(CommandEvent::AppendChunk(chunk)));
                }
                CmdState::ExpectIdleDone => {
                    let input = &self.buffer[self.consumed..];
                    if input.is_empty() {
                        return Ok(None);
                    }

                    match idle_done(input) {
                        Ok((remaining, _)) => {
                            let used = input.len() - remaining.len();
                            self.advance(used);
                            self.state = CmdState::Line;
                            self.assert_framing();
                            return Ok(Some(CommandEvent::IdleDone));
                        }
                        Err(nom::Err::Incomplete(_)) => return self.need_more(),
                        Err(error) => return self.fail(into_decode_error(input.len(), error)),
                    }
                }
            }
        }
    }

    fn advance(&mut self, count: usize) {
        self.consumed += count;
        self.total_consumed += count as u64;
    }

    /// Framing soundness: at a message boundary the full parser must not be
    /// ahead of the framing pre-parser.
    fn assert_framing(&self) {
        debug_assert!(
            self.total_consumed <= self.scanner.maximum_valid_bytes(),
            "parser consumed {} bytes but framing only validated {}",
            self.total_consumed,
            self.scanner.maximum_valid_bytes(),
        );
    }

    fn compact(&mut self) {
        if self.consumed == self.buffer.len() {
            self.buffer.clear();
            self.consumed = 0;
        } else if self.consumed > 4096 {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
    }

    fn need_more(&mut self) -> Result<Option<CommandEvent>, StreamError> {
        if self.buffer.len() - self.consumed > self.limit {
            return self.fail(DecodeError::BufferLimitExceeded { limit: self.limit });
        }

        Ok(None)
    }

    fn fail<T>(&mut self, error: DecodeError) -> Result<Option<T>, StreamError> {
        let error = StreamError {
            error,
            buffer: self.buffer[self.consumed..].to_vec(),
        };
        log::warn!("command decoder failed: {}", error.error);
        self.failed = Some(error.clone());
        Err(error)
    }
}

/// `tag SP "APPEND" SP mailbox`
fn append_begin(input: &[u8]) -> WireResult<(Tag, Mailbox)> {
    map(
        tuple((
            terminated(tag_imap, sp),
            terminated(tag_no_case(b"APPEND"), sp),
            mailbox,
        )),
        |(tag, _, mailbox)| (tag, mailbox),
    )(input)
}

/// `[SP flag-list] [SP date-time] SP literal-header`
#[allow(clippy::type_complexity)]
fn append_message_header(
    input: &[u8],
) -> WireResult<(Vec<Flag>, Option<DateTime>, u32, bool)> {
    map(
        tuple((
            opt(preceded(sp, flag_list)),
            opt(preceded(sp, crate::parse::datetime::date_time)),
            sp,
            literal_header,
        )),
        |(flags, date, _, header)| {
            (
                flags.unwrap_or_default(),
                date,
                header.length,
                header.binary,
            )
        },
    )(input)
}

// ----- outbound -----------------------------------------------------------

/// What the session layer can hand to the outbound side.
#[derive(Clone, Debug)]
pub enum CommandStreamPart {
    Command(Command),
    IdleDone,
    /// Raw bytes, e.g. authenticate-data lines. Sent as a single chunk.
    Raw(Vec<u8>),
}

/// Client-side chunk gate.
///
/// Parts are encoded in client-sync mode against the current capability
/// set; chunks of one part are released one at a time, waiting for a
/// continuation request across every synchronizing-literal boundary.
/// Distinct parts never wait on each other.
#[derive(Debug, Default)]
pub struct Outbound {
    capabilities: Capabilities,
    queue: VecDeque<VecDeque<Vec<u8>>>,
    awaiting_continuation: bool,
}

impl Outbound {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            queue: VecDeque::new(),
            awaiting_continuation: false,
        }
    }

    /// Replace the capability snapshot. Takes effect for the next pushed
    /// part; already-encoded chunks are unaffected.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    pub fn push(&mut self, part: CommandStreamPart) {
        let encoded: Encoded = match part {
            CommandStreamPart::Command(command) => encode_command(&command, &self.capabilities),
            CommandStreamPart::IdleDone => encode_idle_done(),
            CommandStreamPart::Raw(bytes) => {
                self.queue.push_back(VecDeque::from([bytes]));
                return;
            }
        };

        self.queue.push_back(encoded.collect());
    }

    /// The next chunk ready for the wire, or `None` when idle or awaiting a
    /// continuation request.
    pub fn next_chunk(&mut self) -> Option<Vec<u8>> {
        if self.awaiting_continuation {
            return None;
        }

        let part = self.queue.front_mut()?;
        let chunk = part.pop_front()?;

        if part.is_empty() {
            self.queue.pop_front();
        } else {
            // The chunk ended right after a synchronizing literal header.
            self.awaiting_continuation = true;
        }

        Some(chunk)
    }

    /// The peer sent `+`; release the next chunk.
    pub fn continuation_received(&mut self) {
        self.awaiting_continuation = false;
    }

    pub fn is_awaiting_continuation(&self) -> bool {
        self.awaiting_continuation
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
