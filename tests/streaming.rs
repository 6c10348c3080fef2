//! Incremental decoding, framing soundness, and adversarial inputs.

use std::num::NonZeroU32;

use imap_wire::{
    encode::encode_command,
    framing::FrameScanner,
    parse::{decode_command, decode_response, DecodeError},
    stream::{
        CommandEvent, CommandStream, CommandStreamPart, Outbound, ResponseEvent, ResponseStream,
    },
    types::{
        capability::{Capabilities, Capability},
        command::{AppendMessage, Command, CommandBody},
        fetch::MessageDataItem,
        flag::Flag,
        mailbox::Mailbox,
    },
};

fn drain(stream: &mut ResponseStream) -> Vec<ResponseEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next_event().unwrap() {
        events.push(event);
    }
    events
}

/// Merge consecutive body chunks so event sequences can be compared across
/// different feeding granularities.
fn normalize(events: Vec<ResponseEvent>) -> Vec<ResponseEvent> {
    let mut normalized: Vec<ResponseEvent> = Vec::new();

    for event in events {
        match (normalized.last_mut(), event) {
            (Some(ResponseEvent::BodyChunk(acc)), ResponseEvent::BodyChunk(chunk)) => {
                acc.extend_from_slice(&chunk);
            }
            (_, event) => normalized.push(event),
        }
    }

    normalized
}

// ----- concrete end-to-end scenarios --------------------------------------

#[test]
fn scenario_simple_command_roundtrip() {
    let (remainder, command) = decode_command(b"1 NOOP\r\n").unwrap();
    assert!(remainder.is_empty());
    assert_eq!(command, Command::new("1", CommandBody::Noop).unwrap());
    assert_eq!(
        encode_command(&command, &Capabilities::new()).dump(),
        b"1 NOOP\r\n".to_vec()
    );
}

fn append_hello() -> Command {
    Command::new(
        "A001",
        CommandBody::Append {
            mailbox: Mailbox::Inbox,
            messages: imap_wire::core::NonEmptyVec::new(AppendMessage {
                flags: vec![Flag::Seen],
                date: None,
                data: b"hello".to_vec(),
            }),
        },
    )
    .unwrap()
}

#[test]
fn scenario_append_with_synchronizing_literal() {
    let chunks: Vec<Vec<u8>> = encode_command(&append_hello(), &Capabilities::new()).collect();
    assert_eq!(
        chunks,
        vec![
            b"A001 APPEND \"INBOX\" (\\Seen) {5}\r\n".to_vec(),
            b"hello\r\n".to_vec(),
        ],
    );
}

#[test]
fn scenario_append_with_literal_plus() {
    let caps = Capabilities::from_iter([Capability::LiteralPlus]);
    let chunks: Vec<Vec<u8>> = encode_command(&append_hello(), &caps).collect();
    assert_eq!(
        chunks,
        vec![b"A001 APPEND \"INBOX\" (\\Seen) {5+}\r\nhello\r\n".to_vec()],
    );
}

#[test]
fn scenario_uid_search_roundtrip() {
    let input = b"A1 UID SEARCH 1:5,8,10:*\r\n";
    let (_, command) = decode_command(input).unwrap();
    assert_eq!(
        encode_command(&command, &Capabilities::new()).dump(),
        input.to_vec()
    );
}

#[test]
fn scenario_id_nil_roundtrip() {
    use imap_wire::{encode::encode_response, parse::decode_response};

    let input = b"* ID NIL\r\n";
    let (_, response) = decode_response(input).unwrap();
    assert_eq!(encode_response(&response).dump(), input.to_vec());
}

#[test]
fn scenario_fetch_body_streaming() {
    let input = b"* 1 FETCH (BODY[] {5}\r\nhello)\r\n";

    // Fed byte by byte, the decoder emits begin/header/chunk*/end and never
    // holds the payload.
    let mut stream = ResponseStream::new();
    let mut events = Vec::new();
    for byte in input.iter() {
        stream.feed(std::slice::from_ref(byte));
        while let Some(event) = stream.next_event().unwrap() {
            events.push(event);
        }
    }

    assert_eq!(events.len(), 2 + 5 + 1);
    assert_eq!(
        events[0],
        ResponseEvent::FetchBegin {
            seq: NonZeroU32::new(1).unwrap()
        }
    );
    assert!(matches!(
        events[1],
        ResponseEvent::BodyHeader { length: 5, .. }
    ));
    for (index, expected) in b"hello".iter().enumerate() {
        assert_eq!(events[2 + index], ResponseEvent::BodyChunk(vec![*expected]));
    }
    assert_eq!(events.last().unwrap(), &ResponseEvent::FetchEnd);
}

// ----- incremental equivalence (P3) ---------------------------------------

#[test]
fn incremental_equivalence_across_chunk_sizes() {
    let input: &[u8] = b"* 23 EXISTS\r\n\
* 1 FETCH (UID 4 BODY[] {5}\r\nhello FLAGS (\\Seen))\r\n\
+ idling\r\n\
* LIST (\\Noselect) \"/\" foo\r\n\
A1 OK done\r\n";

    let mut single = ResponseStream::new();
    single.feed(input);
    let expected = normalize(drain(&mut single));

    for chunk_size in [1, 2, 3, 7, 16] {
        let mut stream = ResponseStream::new();
        let mut events = Vec::new();

        for chunk in input.chunks(chunk_size) {
            stream.feed(chunk);
            while let Some(event) = stream.next_event().unwrap() {
                events.push(event);
            }
        }

        assert_eq!(normalize(events), expected, "chunk size {chunk_size}");
    }

    // EXISTS, six FETCH events (begin, UID, body header, one coalesced
    // chunk, FLAGS, end), the continuation request, LIST, and the tagged OK.
    assert_eq!(expected.len(), 10);
    assert!(matches!(
        expected[5],
        ResponseEvent::FetchItem(MessageDataItem::Flags(_))
    ));
    assert_eq!(expected[4], ResponseEvent::BodyChunk(b"hello".to_vec()));
}

// ----- framing soundness (P4) ---------------------------------------------

#[test]
fn framing_bounds_parser_consumption() {
    let input: &[u8] = b"a LOGIN {5}\r\nalice pass\r\nb NOOP\r\nc APPEND m {3+}\r\nxyz\r\n";

    for chunk_size in [1, 3, 5, input.len()] {
        let mut scanner = FrameScanner::new();
        let mut buffer: Vec<u8> = Vec::new();
        let mut consumed = 0u64;

        for chunk in input.chunks(chunk_size) {
            scanner.scan(chunk);
            buffer.extend_from_slice(chunk);

            // Drain all complete commands from the buffer.
            loop {
                match decode_command(&buffer) {
                    Ok((remaining, _)) => {
                        let used = buffer.len() - remaining.len();
                        consumed += used as u64;
                        buffer.drain(..used);
                    }
                    Err(DecodeError::Incomplete) => break,
                    Err(other) => panic!("unexpected error: {other}"),
                }

                assert!(
                    consumed <= scanner.maximum_valid_bytes(),
                    "parser consumed {consumed}, framer validated {}",
                    scanner.maximum_valid_bytes()
                );
            }
        }

        assert_eq!(consumed, input.len() as u64);
        assert_eq!(scanner.maximum_valid_bytes(), input.len() as u64);
    }
}

#[test]
fn command_stream_emits_continuations_in_order() {
    let mut stream = CommandStream::new();

    stream.feed(b"a LOGIN {5}\r\n");
    assert_eq!(stream.take_pending_continuations(), 1);

    stream.feed(b"alice {4}\r\npass\r\nb NOOP\r\n");
    assert_eq!(stream.take_pending_continuations(), 1);
    assert_eq!(stream.take_pending_continuations(), 0);

    assert!(matches!(
        stream.next_event().unwrap().unwrap(),
        CommandEvent::Command(_)
    ));
    assert!(matches!(
        stream.next_event().unwrap().unwrap(),
        CommandEvent::Command(_)
    ));
    assert_eq!(stream.next_event().unwrap(), None);
}

// ----- adversarial inputs (P5) --------------------------------------------

fn adversarial_vectors() -> Vec<Vec<u8>> {
    let mut vectors = Vec::new();

    // "+000…000}\n"
    let mut zeros = b"+".to_vec();
    zeros.extend(std::iter::repeat(b'0').take(120));
    zeros.extend_from_slice(b"}\n");
    vectors.push(zeros);

    vectors.push(b"eSequence468117eY SEARCH 4:1 000,0\n000059?000000600=)O".to_vec());

    vectors.push(vec![
        0x41, 0x5d, 0x20, 0x55, 0x49, 0x44, 0x20, 0x43, 0x4f, 0x50, 0x59, 0x20, 0x35, 0x2c,
        0x35, 0x3a, 0x34, 0x00, 0x3d, 0x0c, 0x0a, 0x43, 0x20, 0x22, 0xe8,
    ]);

    vectors
}

/// A tiny deterministic generator, enough to exercise the no-crash property
/// without a fuzzing dependency.
struct Lcg(u64);

impl Lcg {
    fn next_byte(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u8
    }
}

#[test]
fn adversarial_inputs_never_panic() {
    let mut vectors = adversarial_vectors();

    let mut lcg = Lcg(0x1234_5678_9abc_def0);
    for length in [0usize, 1, 7, 64, 512] {
        let mut bytes: Vec<u8> = (0..length).map(|_| lcg.next_byte()).collect();
        vectors.push(bytes.clone());
        // Bias towards line-shaped input.
        bytes.extend_from_slice(b"\r\n");
        vectors.push(bytes);
    }

    for vector in &vectors {
        // Whole-buffer decoders: any outcome is fine, panics are not.
        let _ = decode_command(vector);
        let _ = decode_response(vector);

        // The framer accepts anything.
        let mut scanner = FrameScanner::new();
        scanner.scan(vector);

        // The streams must stay well-behaved, fed bytewise.
        let mut commands = CommandStream::new();
        let mut responses = ResponseStream::new();
        for byte in vector.iter() {
            commands.feed(std::slice::from_ref(byte));
            responses.feed(std::slice::from_ref(byte));
            while let Ok(Some(_)) = commands.next_event() {}
            while let Ok(Some(_)) = responses.next_event() {}
        }
    }
}

#[test]
fn adversarial_vector_outcomes() {
    let vectors = adversarial_vectors();

    // The huge brace count must not be misread as a literal announcement.
    let mut scanner = FrameScanner::new();
    let result = scanner.scan(&vectors[0]);
    assert_eq!(result.synchronizing_literals, 0);
    assert_eq!(result.maximum_valid_bytes, vectors[0].len() as u64);

    // The reversed range with trailing garbage is a parse error, not a hang.
    assert!(matches!(
        decode_command(&vectors[1]),
        Err(DecodeError::Parse { .. })
    ));

    // The NUL-bearing UID COPY is a parse error.
    assert!(matches!(
        decode_command(&vectors[2]),
        Err(DecodeError::Parse { .. })
    ));
}

// ----- mailbox canonicalization (P6) --------------------------------------

#[test]
fn inbox_case_variants_canonicalize() {
    for name in ["inbox", "INBOX", "Inbox", "iNBoX", "inBOX"] {
        let mailbox = Mailbox::try_from(name).unwrap();
        assert_eq!(mailbox, Mailbox::Inbox);
        assert_eq!(mailbox.as_bytes(), b"INBOX");
    }

    for name in ["INBO", "INBOXX", "inbox/sub"] {
        let mailbox = Mailbox::try_from(name).unwrap();
        assert_ne!(mailbox, Mailbox::Inbox);
    }
}

// ----- outbound pipeline ---------------------------------------------------

#[test]
fn outbound_pipeline_full_exchange() {
    let mut outbound = Outbound::new(Capabilities::new());
    let mut server = CommandStream::new();

    outbound.push(CommandStreamPart::Command(append_hello()));
    outbound.push(CommandStreamPart::Command(
        Command::new("A002", CommandBody::Idle).unwrap(),
    ));
    outbound.push(CommandStreamPart::IdleDone);

    // Chunk 1: the header line, up to and including the literal header.
    let chunk = outbound.next_chunk().unwrap();
    server.feed(&chunk);
    assert_eq!(server.take_pending_continuations(), 1);
    assert!(matches!(
        server.next_event().unwrap().unwrap(),
        CommandEvent::AppendBegin { .. }
    ));
    assert!(matches!(
        server.next_event().unwrap().unwrap(),
        CommandEvent::AppendMessage { length: 5, .. }
    ));

    // The client waits for `+` before releasing the payload.
    assert!(outbound.next_chunk().is_none());
    outbound.continuation_received();

    let chunk = outbound.next_chunk().unwrap();
    server.feed(&chunk);
    assert_eq!(
        server.next_event().unwrap().unwrap(),
        CommandEvent::AppendChunk(b"hello".to_vec())
    );
    assert_eq!(server.next_event().unwrap().unwrap(), CommandEvent::AppendEnd);

    // IDLE and DONE pass through without any waiting.
    let chunk = outbound.next_chunk().unwrap();
    server.feed(&chunk);
    match server.next_event().unwrap().unwrap() {
        CommandEvent::Command(command) => assert_eq!(command.body, CommandBody::Idle),
        other => panic!("unexpected: {other:?}"),
    }

    server.expect_idle_done();
    let chunk = outbound.next_chunk().unwrap();
    assert_eq!(chunk, b"DONE\r\n".to_vec());
    server.feed(&chunk);
    assert_eq!(server.next_event().unwrap().unwrap(), CommandEvent::IdleDone);

    assert!(outbound.is_empty());
}
