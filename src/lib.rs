//! # imap-wire
//!
//! A wire-protocol codec for IMAP4rev1 (RFC 3501) extended with the common
//! option set: `LITERAL+`/`LITERAL-` (RFC 7888), `BINARY` (RFC 3516),
//! `CONDSTORE` (RFC 7162), `ENABLE` (RFC 5161), `ID` (RFC 2971),
//! `NAMESPACE` (RFC 2342), `MOVE` (RFC 6851), `ESEARCH` (RFC 4731),
//! `LIST-EXTENDED` (RFC 5258), `METADATA` (RFC 5464), and `URLAUTH`
//! (RFC 4467).
//!
//! The crate has four parts:
//!
//! - [`types`]: the typed AST of every command, response, and response
//!   fragment — exhaustive enums mirroring the IMAP formal syntax, built on
//!   the string primitives in [`core`].
//! - [`encode`]: a streaming byte writer. [`encode::EncodeBuffer`] decides
//!   whether a string goes on the wire as an atom, quoted string, literal
//!   `{n}`, or binary literal `~{n}`, and in client mode splits the output
//!   into chunks at synchronizing-literal boundaries.
//! - [`parse`]: an incremental recursive-descent parser of the same
//!   grammar. Running out of bytes yields
//!   [`parse::DecodeError::Incomplete`]; the caller feeds more bytes and
//!   retries.
//! - [`framing`] and [`stream`]: a literal-counting framing pre-parser and
//!   the byte-to-message processors gluing everything to a transport,
//!   including O(1)-memory streaming of FETCH and APPEND payloads.
//!
//! Everything is synchronous and single-threaded; each connection owns its
//! own buffers and streams.
//!
//! ```rust
//! use imap_wire::{
//!     encode::encode_command,
//!     parse::decode_command,
//!     types::capability::Capabilities,
//! };
//!
//! let (rest, command) = decode_command(b"1 NOOP\r\n").unwrap();
//! assert!(rest.is_empty());
//!
//! let encoded = encode_command(&command, &Capabilities::new());
//! assert_eq!(encoded.dump(), b"1 NOOP\r\n".to_vec());
//! ```

pub mod core;
pub mod encode;
pub mod framing;
pub mod parse;
pub mod stream;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

pub use crate::{
    encode::{
        encode_command, encode_greeting, encode_idle_done, encode_response, Encode, EncodeBuffer,
        EncodeMode, Encoded,
    },
    framing::{FrameScanner, FramingResult},
    parse::{
        decode_authenticate_data, decode_command, decode_greeting, decode_idle_done,
        decode_response, DecodeError,
    },
    stream::{
        CommandEvent, CommandStream, CommandStreamPart, Outbound, ResponseEvent, ResponseStream,
        StreamError,
    },
};
