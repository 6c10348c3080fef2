//! Roundtrips over realistic session traces.
//!
//! Every client line must decode as a command and every server line as a
//! response; re-encoding the decoded value must decode to the same value,
//! and the canonical encoding must be a fixed point.

use imap_wire::{
    encode::{encode_command, encode_response},
    parse::{decode_command, decode_response},
    types::capability::Capabilities,
};

enum Who {
    Client,
    Server,
}

struct TraceLines<'a> {
    trace: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for TraceLines<'a> {
    type Item = (Who, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let input = &self.trace[self.offset..];

        if let Some(position) = input.iter().position(|b| *b == b'\n') {
            let who = match &input[..3] {
                b"C: " => Who::Client,
                b"S: " => Who::Server,
                _ => panic!("line must begin with \"C: \" or \"S: \""),
            };

            self.offset += position + 1;

            Some((who, &input[3..position + 1]))
        } else {
            None
        }
    }
}

fn split_trace(trace: &[u8]) -> impl Iterator<Item = (Who, &[u8])> {
    TraceLines { trace, offset: 0 }
}

fn test_lines_of_trace(trace: &[u8]) {
    for (who, line) in split_trace(trace) {
        // Replace the trailing "\n" with "\r\n".
        let line = {
            let mut line = line[..line.len().saturating_sub(1)].to_vec();
            line.extend_from_slice(b"\r\n");
            line
        };

        match who {
            Who::Client => {
                println!("C: {}", String::from_utf8_lossy(&line).trim());
                let (remainder, parsed) = decode_command(&line).unwrap();
                assert!(remainder.is_empty());

                let serialized = encode_command(&parsed, &Capabilities::new()).dump();
                let (remainder, parsed_again) = decode_command(&serialized).unwrap();
                assert!(remainder.is_empty());
                assert_eq!(parsed, parsed_again);

                let serialized_again =
                    encode_command(&parsed_again, &Capabilities::new()).dump();
                assert_eq!(serialized, serialized_again);
            }
            Who::Server => {
                println!("S: {}", String::from_utf8_lossy(&line).trim());
                let (remainder, parsed) = decode_response(&line).unwrap();
                assert!(remainder.is_empty());

                let serialized = encode_response(&parsed).dump();
                let (remainder, parsed_again) = decode_response(&serialized).unwrap();
                assert!(remainder.is_empty());
                assert_eq!(parsed, parsed_again);

                let serialized_again = encode_response(&parsed_again).dump();
                assert_eq!(serialized, serialized_again);
            }
        }
    }
}

#[test]
fn test_rfc3501_session() {
    // Adapted from RFC 3501 section 8 (the greeting line is handled by
    // `decode_greeting` and therefore not part of this trace).
    let trace = br#"C: a001 login mrc secret
S: a001 OK LOGIN completed
C: a002 select inbox
S: * 18 EXISTS
S: * FLAGS (\Answered \Flagged \Deleted \Seen \Draft)
S: * 2 RECENT
S: * OK [UNSEEN 17] Message 17 is the first unseen message
S: * OK [UIDVALIDITY 3857529045] UIDs valid
S: a002 OK [READ-WRITE] SELECT completed
C: a003 fetch 12 full
S: * 12 FETCH (FLAGS (\Seen) INTERNALDATE "17-Jul-1996 02:44:25 -0700" RFC822.SIZE 4286 ENVELOPE ("Wed, 17 Jul 1996 02:23:25 -0700 (PDT)" "IMAP4rev1 WG mtg summary and minutes" (("Terry Gray" NIL "gray" "cac.washington.edu")) (("Terry Gray" NIL "gray" "cac.washington.edu")) (("Terry Gray" NIL "gray" "cac.washington.edu")) ((NIL NIL "imap" "cac.washington.edu")) ((NIL NIL "minutes" "CNRI.Reston.VA.US")("John Klensin" NIL "KLENSIN" "MIT.EDU")) NIL NIL "<B27397-0100000@cac.washington.edu>") BODY ("TEXT" "PLAIN" ("CHARSET" "US-ASCII") NIL NIL "7BIT" 3028 92))
S: a003 OK FETCH completed
C: a004 fetch 12 body[header]
S: a004 OK FETCH completed
C: a005 store 12 +flags \deleted
S: * 12 FETCH (FLAGS (\Seen \Deleted))
S: a005 OK +FLAGS completed
C: a006 logout
S: * BYE IMAP4rev1 server terminating connection
S: a006 OK LOGOUT completed
"#;

    test_lines_of_trace(trace);
}

#[test]
fn test_extension_session() {
    let trace = br##"C: a ENABLE CONDSTORE
S: * ENABLED CONDSTORE
S: a OK ENABLE completed
C: b SELECT Drafts (CONDSTORE)
S: * OK [HIGHESTMODSEQ 715194045007] Highest mailbox mod-sequence
S: b OK [READ-WRITE] SELECT completed
C: c UID FETCH 1:* (FLAGS) (CHANGEDSINCE 12345)
S: * 1 FETCH (UID 4 MODSEQ (12121230045) FLAGS (\Seen))
S: c OK FETCH completed
C: d STORE 7,9 (UNCHANGEDSINCE 320162338) +FLAGS.SILENT (\Deleted)
S: d OK [MODIFIED 7,9] Conditional STORE failed
C: e UID SEARCH RETURN (MIN MAX COUNT) UNSEEN
S: * ESEARCH (TAG "e") UID MIN 2 MAX 47 COUNT 3
S: e OK SEARCH completed
C: f ID ("name" "sodr" "version" "19.34" "vendor" "Pink Floyd Music Limited")
S: * ID NIL
S: f OK ID completed
C: g NAMESPACE
S: * NAMESPACE (("" "/")) NIL (("#shared/" "/")("#public/" "/"))
S: g OK NAMESPACE completed
C: h MOVE 1:5 Archive
S: * OK [ALERT] moved
S: h OK MOVE completed
C: i GETMETADATA (MAXSIZE 1024) INBOX (/shared/comment /private/comment)
S: * METADATA INBOX (/shared/comment "Shared comment" /private/comment NIL)
S: i OK GETMETADATA completed
C: j SETMETADATA INBOX (/shared/comment "My new comment")
S: j OK SETMETADATA completed
C: k LIST (SUBSCRIBED) "" "*" RETURN (SUBSCRIBED CHILDREN)
S: * LIST (\Marked \NoInferiors) "/" "inbox1"
S: k OK LIST completed
C: l GENURLAUTH "imap://joe@example.com/INBOX/;uid=20;expire=2006-10-20T00:00:00Z" INTERNAL
S: * GENURLAUTH "imap://joe@example.com/INBOX/;uid=20;expire=2006-10-20T00:00:00Z;urlauth=anonymous:internal:91354a473744909de610943775f92038"
S: l OK GENURLAUTH completed
"##;

    test_lines_of_trace(trace);
}

#[test]
fn test_greeting_roundtrip() {
    use imap_wire::{encode::encode_greeting, parse::decode_greeting};

    for line in [
        b"* OK IMAP4rev1 Service Ready\r\n".as_ref(),
        b"* PREAUTH IMAP4rev1 server logged in as Smith\r\n",
        b"* BYE LOGOUT forced\r\n",
        b"* OK [CAPABILITY IMAP4REV1 LITERAL+ IDLE] ready\r\n",
    ] {
        let (remainder, greeting) = decode_greeting(line).unwrap();
        assert!(remainder.is_empty());

        let serialized = encode_greeting(&greeting).dump();
        let (_, greeting_again) = decode_greeting(&serialized).unwrap();
        assert_eq!(greeting, greeting_again);
    }
}

#[test]
fn test_literal_heavy_command() {
    // A command whose mailbox and payload both arrive as literals.
    let line = b"a APPEND {6}\r\nfolder (\\Seen) {5}\r\nhello\r\n";

    let (remainder, parsed) = decode_command(line).unwrap();
    assert!(remainder.is_empty());

    let serialized = encode_command(&parsed, &Capabilities::new()).dump();
    let (_, parsed_again) = decode_command(&serialized).unwrap();
    assert_eq!(parsed, parsed_again);
}
