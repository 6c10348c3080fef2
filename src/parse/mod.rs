//! Incremental, suspendable parsing of IMAP messages.
//!
//! The parsers are written against `nom`'s *streaming* combinators: running
//! out of input yields [`DecodeError::Incomplete`], the caller keeps the
//! buffer, appends more bytes, and retries. Non-streaming productions
//! restart from scratch on retry; this is correct because the reader index
//! only moves on success.

pub(crate) mod body;
pub(crate) mod command;
pub(crate) mod core;
pub(crate) mod datetime;
pub(crate) mod envelope;
pub(crate) mod fetch;
pub(crate) mod flag;
pub(crate) mod mailbox;
pub(crate) mod metadata;
pub(crate) mod response;
pub(crate) mod search;
pub(crate) mod sequence;
pub(crate) mod status;

use std::num::{ParseIntError, TryFromIntError};

use nom::error::{ErrorKind, FromExternalError, ParseError};
use thiserror::Error;

use crate::types::{
    auth::AuthenticateData,
    command::{Command, IdleDone},
    response::{Greeting, Response},
};

/// An extended version of [`nom::IResult`] carrying IMAP-specific error
/// kinds.
pub(crate) type WireResult<'a, O> = Result<(&'a [u8], O), nom::Err<WireParseError<'a>>>;

#[derive(Debug)]
pub(crate) struct WireParseError<'a> {
    pub(crate) input: &'a [u8],
    pub(crate) kind: WireErrorKind,
}

#[derive(Debug)]
pub(crate) enum WireErrorKind {
    BadNumber,
    BadBase64,
    BadDateTime,
    LiteralContainsNul,
    TooDeep,
    Nom(ErrorKind),
}

impl<'a> ParseError<&'a [u8]> for WireParseError<'a> {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        Self {
            input,
            kind: WireErrorKind::Nom(kind),
        }
    }

    fn append(input: &'a [u8], kind: ErrorKind, _: Self) -> Self {
        Self {
            input,
            kind: WireErrorKind::Nom(kind),
        }
    }
}

impl<'a> FromExternalError<&'a [u8], ParseIntError> for WireParseError<'a> {
    fn from_external_error(input: &'a [u8], _: ErrorKind, _: ParseIntError) -> Self {
        Self {
            input,
            kind: WireErrorKind::BadNumber,
        }
    }
}

impl<'a> FromExternalError<&'a [u8], TryFromIntError> for WireParseError<'a> {
    fn from_external_error(input: &'a [u8], _: ErrorKind, _: TryFromIntError) -> Self {
        Self {
            input,
            kind: WireErrorKind::BadNumber,
        }
    }
}

impl<'a> FromExternalError<&'a [u8], base64::DecodeError> for WireParseError<'a> {
    fn from_external_error(input: &'a [u8], _: ErrorKind, _: base64::DecodeError) -> Self {
        Self {
            input,
            kind: WireErrorKind::BadBase64,
        }
    }
}

/// The public error taxonomy of the decoder.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DecodeError {
    /// More bytes are needed. Non-fatal: keep the buffer and retry once more
    /// data arrived.
    #[error("incomplete message, more data needed")]
    Incomplete,

    /// The bytes do not form a valid message. Fatal for this buffer.
    #[error("parse error at byte {position}: expected {expected}")]
    Parse {
        /// Byte offset into the buffer handed to the decoder.
        position: usize,
        /// The token class the parser was looking for.
        expected: &'static str,
    },

    /// A number field exceeded its width (u32, or u64 for mod-sequences).
    #[error("integer overflow at byte {position}")]
    IntegerOverflow { position: usize },

    /// An unfinished message has grown past the configured limit.
    #[error("unfinished message exceeded the {limit}-byte buffer limit")]
    BufferLimitExceeded { limit: usize },
}

fn describe(kind: &WireErrorKind) -> &'static str {
    match kind {
        WireErrorKind::BadNumber => "number",
        WireErrorKind::BadBase64 => "base64",
        WireErrorKind::BadDateTime => "date-time",
        WireErrorKind::LiteralContainsNul => "literal without NUL",
        WireErrorKind::TooDeep => "body structure within nesting limits",
        WireErrorKind::Nom(kind) => match kind {
            ErrorKind::Tag => "keyword",
            ErrorKind::TakeWhile1 => "token",
            ErrorKind::Char | ErrorKind::OneOf => "character",
            ErrorKind::Alt => "one of several alternatives",
            ErrorKind::Digit => "digit",
            ErrorKind::Verify | ErrorKind::MapRes => "valid value",
            ErrorKind::CrLf => "CRLF",
            _ => "valid syntax",
        },
    }
}

pub(crate) fn into_decode_error(input_len: usize, error: nom::Err<WireParseError>) -> DecodeError {
    match error {
        nom::Err::Incomplete(_) => DecodeError::Incomplete,
        nom::Err::Error(error) | nom::Err::Failure(error) => {
            let position = input_len.saturating_sub(error.input.len());
            match error.kind {
                WireErrorKind::BadNumber => DecodeError::IntegerOverflow { position },
                kind => DecodeError::Parse {
                    position,
                    expected: describe(&kind),
                },
            }
        }
    }
}

macro_rules! decode_fn {
    ($(#[$meta:meta])* $name:ident, $parser:path, $output:ty) => {
        $(#[$meta])*
        pub fn $name(input: &[u8]) -> Result<(&[u8], $output), DecodeError> {
            $parser(input).map_err(|error| into_decode_error(input.len(), error))
        }
    };
}

decode_fn!(
    /// Decode one complete command (including CRLF and literal payloads).
    decode_command,
    command::command,
    Command
);

decode_fn!(
    /// Decode one complete response.
    decode_response,
    response::response,
    Response
);

decode_fn!(
    /// Decode the server greeting.
    decode_greeting,
    response::greeting,
    Greeting
);

decode_fn!(
    /// Decode one authenticate-data line.
    decode_authenticate_data,
    command::authenticate_data,
    AuthenticateData
);

decode_fn!(
    /// Decode the IDLE `DONE` line.
    decode_idle_done,
    command::idle_done,
    IdleDone
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::command::CommandBody;

    #[test]
    fn test_decode_command() {
        let tests: &[(&[u8], _)] = &[
            (
                b"a noop\r\n",
                Ok((
                    b"".as_ref(),
                    Command::new("a", CommandBody::Noop).unwrap(),
                )),
            ),
            (
                b"a noop\r\n???",
                Ok((
                    b"???".as_ref(),
                    Command::new("a", CommandBody::Noop).unwrap(),
                )),
            ),
            (b"a", Err(DecodeError::Incomplete)),
            (b"a ", Err(DecodeError::Incomplete)),
            (b"a noop", Err(DecodeError::Incomplete)),
            (b"a noop\r", Err(DecodeError::Incomplete)),
            // A select command whose literal payload has not arrived yet.
            (b"a select {5}\r\n", Err(DecodeError::Incomplete)),
            (b"a select {5}\r\nxxx", Err(DecodeError::Incomplete)),
        ];

        for (input, expected) in tests {
            assert_eq!(&decode_command(input), expected, "input: {input:?}");
        }

        assert!(matches!(
            decode_command(b"* noop\r\n"),
            Err(DecodeError::Parse { .. })
        ));
        assert!(matches!(
            decode_command(b"a  noop\r\n"),
            Err(DecodeError::Parse { .. })
        ));
    }

    #[test]
    fn test_select_with_literal_mailbox() {
        let (remaining, command) = decode_command(b"a select {5}\r\ninbox\r\nxxx").unwrap();
        assert_eq!(remaining, b"xxx");
        assert_eq!(
            command,
            Command::new("a", CommandBody::select("inbox").unwrap()).unwrap(),
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            decode_command(b"a fetch 99999999999999 FLAGS\r\n"),
            Err(DecodeError::IntegerOverflow { .. })
        ));
    }
}
