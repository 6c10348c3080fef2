//! Known-answer test helpers.

use std::fmt::Debug;

use crate::{
    encode::{encode_command, encode_response, Encode, EncodeBuffer},
    parse::{decode_command, decode_response},
    types::{capability::Capabilities, command::Command, response::Response},
    utils::escape_byte_string,
};

#[track_caller]
pub(crate) fn encodes_to_server(value: &impl Encode, expected: &[u8]) {
    let mut buf = EncodeBuffer::server();
    value.encode(&mut buf);
    let got = buf.finish().dump();

    if got != expected {
        panic!(
            "Left:  <<<{}>>>\nRight: <<<{}>>>",
            escape_byte_string(expected),
            escape_byte_string(&got),
        );
    }
}

#[track_caller]
pub(crate) fn known_answer_test_parse<'a, O, P>(
    (input, expected_remainder, expected): (&'a [u8], &[u8], O),
    parser: P,
) where
    O: Debug + Eq + 'a,
    P: Fn(&'a [u8]) -> crate::parse::WireResult<'a, O>,
{
    let (remainder, got) = parser(input).unwrap();
    assert_eq!(expected_remainder, remainder);
    assert_eq!(expected, got);
}

/// Decode, compare, re-encode, decode again, compare again.
#[track_caller]
pub(crate) fn kat_inverse_command(tests: &[(&[u8], &[u8], Command)]) {
    for (no, (input, expected_remainder, expected)) in tests.iter().enumerate() {
        println!("# {no}: {}", escape_byte_string(input));

        let (remainder, got) = decode_command(input).expect("first decoding failed");
        assert_eq!(expected, &got);
        assert_eq!(expected_remainder, &remainder);

        let encoded = encode_command(&got, &Capabilities::new()).dump();
        let (remainder, got_again) = decode_command(&encoded).expect("second decoding failed");
        assert!(remainder.is_empty());
        assert_eq!(got, got_again);
    }
}

#[track_caller]
pub(crate) fn kat_inverse_response(tests: &[(&[u8], &[u8], Response)]) {
    for (no, (input, expected_remainder, expected)) in tests.iter().enumerate() {
        println!("# {no}: {}", escape_byte_string(input));

        let (remainder, got) = decode_response(input).expect("first decoding failed");
        assert_eq!(expected, &got);
        assert_eq!(expected_remainder, &remainder);

        let encoded = encode_response(&got).dump();
        let (remainder, got_again) = decode_response(&encoded).expect("second decoding failed");
        assert!(remainder.is_empty());
        assert_eq!(got, got_again);
    }
}

/// Decode, re-encode, decode again: the reparse must agree, and the second
/// encoding must be byte-identical to the first (canonical form is a fixed
/// point).
#[track_caller]
pub(crate) fn command_roundtrips(inputs: &[&[u8]]) {
    for input in inputs {
        println!("# {}", escape_byte_string(input));

        let (remainder, first) = decode_command(input).expect("first decoding failed");
        assert!(remainder.is_empty());

        let encoded = encode_command(&first, &Capabilities::new()).dump();
        let (remainder, second) = decode_command(&encoded).expect("second decoding failed");
        assert!(remainder.is_empty());
        assert_eq!(first, second);

        let encoded_again = encode_command(&second, &Capabilities::new()).dump();
        assert_eq!(encoded, encoded_again);
    }
}

#[track_caller]
pub(crate) fn response_roundtrips(inputs: &[&[u8]]) {
    for input in inputs {
        println!("# {}", escape_byte_string(input));

        let (remainder, first) = decode_response(input).expect("first decoding failed");
        assert!(remainder.is_empty());

        let encoded = encode_response(&first).dump();
        let (remainder, second) = decode_response(&encoded).expect("second decoding failed");
        assert!(remainder.is_empty());
        assert_eq!(first, second);

        let encoded_again = encode_response(&second).dump();
        assert_eq!(encoded, encoded_again);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parse::core::{astring, atom},
        types::command::{Command, CommandBody},
        types::response::{Data, Response},
    };

    #[test]
    fn test_known_answer_parse_helpers() {
        known_answer_test_parse(
            (
                b"NOOP rest".as_ref(),
                b" rest".as_ref(),
                crate::core::Atom::try_from("NOOP").unwrap(),
            ),
            atom,
        );
        known_answer_test_parse(
            (
                b"\"al ice\" x".as_ref(),
                b" x".as_ref(),
                crate::core::IString::from("al ice"),
            ),
            astring,
        );
    }

    #[test]
    fn test_kat_inverse() {
        kat_inverse_command(&[(
            b"1 NOOP\r\n",
            b"",
            Command::new("1", CommandBody::Noop).unwrap(),
        )]);

        kat_inverse_response(&[(
            b"* 23 EXISTS\r\n",
            b"",
            Response::Data(Data::Exists(23)),
        )]);
    }

    #[test]
    fn test_command_corpus_roundtrips() {
        command_roundtrips(&[
            b"A1 NOOP\r\n",
            b"A2 CAPABILITY\r\n",
            b"A3 LOGOUT\r\n",
            b"A4 STARTTLS\r\n",
            b"A5 CHECK\r\n",
            b"A6 CLOSE\r\n",
            b"A7 EXPUNGE\r\n",
            b"a LOGIN alice \"pa ss\"\r\n",
            b"a LOGIN {5}\r\nalice {4}\r\npass\r\n",
            b"a AUTHENTICATE PLAIN\r\n",
            b"a AUTHENTICATE PLAIN dGVzdA==\r\n",
            b"a AUTHENTICATE PLAIN =\r\n",
            b"a SELECT INBOX\r\n",
            b"a SELECT Archive (CONDSTORE)\r\n",
            b"a EXAMINE blurdybloop\r\n",
            b"a CREATE owatagusiam/\r\n",
            b"a DELETE blurdybloop\r\n",
            b"a RENAME blurdybloop sarasoop\r\n",
            b"a SUBSCRIBE #news.comp.mail.mime\r\n",
            b"a UNSUBSCRIBE #news.comp.mail.mime\r\n",
            b"a LIST \"\" *\r\n",
            b"a LIST (SUBSCRIBED REMOTE) \"\" (\"a\" \"b\") RETURN (CHILDREN)\r\n",
            b"a LSUB \"#news.\" \"comp.mail.*\"\r\n",
            b"a STATUS blurdybloop (UIDNEXT MESSAGES)\r\n",
            b"a STATUS x (HIGHESTMODSEQ)\r\n",
            b"a APPEND saved-messages (\\Seen) {5}\r\nhello\r\n",
            b"a APPEND m (\\Seen) \"17-Jul-1996 02:44:25 -0700\" {3}\r\nabc\r\n",
            b"a APPEND multi {1}\r\nx (\\Draft) {2}\r\nxy\r\n",
            b"a SEARCH FLAGGED SINCE 1-Feb-1994 NOT FROM \"Smith\"\r\n",
            b"a SEARCH CHARSET UTF-8 TEXT {4}\r\nXXXX\r\n",
            b"a UID SEARCH 1:5,8,10:*\r\n",
            b"a UID SEARCH RETURN (MIN MAX COUNT) UNSEEN\r\n",
            b"a SEARCH MODSEQ 620162338\r\n",
            b"a FETCH 2:4 (FLAGS BODY[HEADER.FIELDS (DATE FROM)])\r\n",
            b"a FETCH 1 FULL\r\n",
            b"a FETCH 1 BODY.PEEK[1.2.MIME]<0.100>\r\n",
            b"a FETCH 1 (BINARY[1.2] BINARY.SIZE[1])\r\n",
            b"a FETCH 1:* (FLAGS) (CHANGEDSINCE 12345)\r\n",
            b"a STORE 2:4 +FLAGS (\\Deleted)\r\n",
            b"a STORE 2:4 (UNCHANGEDSINCE 100) -FLAGS.SILENT (\\Seen)\r\n",
            b"a COPY 2:4 meeting\r\n",
            b"a UID COPY 2:4 meeting\r\n",
            b"a MOVE 1:5 Archive\r\n",
            b"a UID MOVE 42 Trash\r\n",
            b"a IDLE\r\n",
            b"a ENABLE CONDSTORE\r\n",
            b"a ID NIL\r\n",
            b"a ID (\"name\" \"sodr\" \"version\" \"19.34\")\r\n",
            b"a GETMETADATA INBOX /shared/comment\r\n",
            b"a GETMETADATA (MAXSIZE 1024) INBOX (/shared/comment /private/comment)\r\n",
            b"a GETMETADATA (DEPTH infinity) x /shared\r\n",
            b"a SETMETADATA INBOX (/shared/comment \"My comment\")\r\n",
            b"a SETMETADATA x (/shared/comment NIL)\r\n",
            b"a URLFETCH imap://joe@example.com/INBOX/;uid=20\r\n",
            b"a GENURLAUTH imap://example.com/Shared/;uid=20 INTERNAL\r\n",
            b"a RESETKEY\r\n",
            b"a RESETKEY INBOX INTERNAL\r\n",
        ]);
    }

    #[test]
    fn test_response_corpus_roundtrips() {
        response_roundtrips(&[
            b"* OK IMAP4rev1 Service Ready\r\n",
            b"A1 OK LOGIN completed\r\n",
            b"A2 NO COPY failed: disk is full\r\n",
            b"A3 BAD command unknown or arguments invalid\r\n",
            b"* BYE Autologout; idle for too long\r\n",
            b"* OK [ALERT] System shutdown in 10 minutes\r\n",
            b"A1 OK [READ-WRITE] SELECT completed\r\n",
            b"* OK [UNSEEN 12] Message 12 is first unseen\r\n",
            b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n",
            b"* OK [UIDNEXT 4392] Predicted next UID\r\n",
            b"* OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] Limited\r\n",
            b"* OK [HIGHESTMODSEQ 715194045007] Highest\r\n",
            b"* OK [NOMODSEQ] Sorry\r\n",
            b"A1 OK [MODIFIED 7,9] Conditional STORE failed\r\n",
            b"* OK [BADCHARSET (UTF-8)] Try again\r\n",
            b"* OK [XWEIRD 1 2 x] preserved verbatim\r\n",
            b"* CAPABILITY IMAP4REV1 LITERAL+ BINARY CONDSTORE ENABLE IDLE AUTH=PLAIN\r\n",
            b"* 23 EXISTS\r\n",
            b"* 5 RECENT\r\n",
            b"* 44 EXPUNGE\r\n",
            b"* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n",
            b"* LIST (\\Noselect) \"/\" foo\r\n",
            b"* LIST (\\Marked) \".\" \"#news.comp.mail.misc\"\r\n",
            b"* LIST () NIL flat\r\n",
            b"* LSUB (\\Noselect) \".\" \"#news.comp.mail\"\r\n",
            b"* STATUS blurdybloop (MESSAGES 231 UIDNEXT 44292)\r\n",
            b"* STATUS x (HIGHESTMODSEQ 7011231777)\r\n",
            b"* SEARCH 2 3 6\r\n",
            b"* SEARCH\r\n",
            b"* SEARCH 2 5 6 (MODSEQ 917162500)\r\n",
            b"* ESEARCH (TAG \"A285\") UID MIN 2 COUNT 3 ALL 2,10:11\r\n",
            b"* ESEARCH (TAG \"A284\") MIN 4\r\n",
            b"* ENABLED CONDSTORE\r\n",
            b"* ID NIL\r\n",
            b"* ID (\"name\" \"Cyrus\" \"version\" \"1.5\" \"os\" NIL)\r\n",
            b"* NAMESPACE ((\"\" \"/\")) NIL NIL\r\n",
            b"* NAMESPACE ((\"\" \"/\")) ((\"~\" \"/\")) ((\"#shared/\" \"/\")(\"#public/\" \"/\"))\r\n",
            b"* METADATA INBOX (/shared/comment \"Shared comment\")\r\n",
            b"* METADATA INBOX /shared/comment /private/comment\r\n",
            b"* GENURLAUTH \"imap://example.com/Shared/;uid=20;urlauth=anonymous\"\r\n",
            b"* URLFETCH imap://example.com/INBOX/;uid=20 {4}\r\nbody\r\n",
            b"+ idling\r\n",
            b"+ VGVzdA==\r\n",
            b"* 12 FETCH (FLAGS (\\Seen \\Recent) INTERNALDATE \"17-Jul-1996 02:44:25 -0700\" RFC822.SIZE 4286 UID 30)\r\n",
            b"* 1 FETCH (MODSEQ (624140003))\r\n",
            b"* 1 FETCH (RFC822 {5}\r\nhello)\r\n",
            b"* 1 FETCH (BODY[] \"data\")\r\n",
            b"* 1 FETCH (BODY[HEADER.FIELDS (\"Subject\")]<42> NIL)\r\n",
            b"* 1 FETCH (BINARY[1.2] ~{4}\r\n\x01\x00\x02\x03)\r\n",
            b"* 1 FETCH (BINARY.SIZE[1] 42)\r\n",
            b"* 12 FETCH (BODY (\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 3028 92))\r\n",
        ]);
    }

    #[test]
    fn test_fetch_envelope_roundtrip() {
        response_roundtrips(&[
            b"* 12 FETCH (ENVELOPE (\"Wed, 17 Jul 1996 02:23:25 -0700 (PDT)\" \"IMAP4rev1 WG mtg summary and minutes\" ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) ((NIL NIL \"imap\" \"cac.washington.edu\")) ((NIL NIL \"minutes\" \"CNRI.Reston.VA.US\")(\"John Klensin\" NIL \"KLENSIN\" \"MIT.EDU\")) NIL NIL \"<B27397-0100000@cac.washington.edu>\"))\r\n",
        ]);
    }

    #[test]
    fn test_multipart_bodystructure_roundtrip() {
        response_roundtrips(&[
            b"* 2 FETCH (BODYSTRUCTURE ((\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 1152 23)(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\" \"NAME\" \"cc.diff\") \"<960723163407.20117h@cac.washington.edu>\" \"Compiler diff\" \"BASE64\" 4554 73) \"MIXED\"))\r\n",
            b"* 3 FETCH (BODYSTRUCTURE (\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 2279 48 \"md5sum\" (\"INLINE\" NIL) NIL))\r\n",
        ]);
    }
}
