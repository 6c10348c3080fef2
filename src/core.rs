//! Core string primitives.
//!
//! IMAP data items come in a handful of lexical shapes: atoms, tags,
//! quoted strings, literals, and `NIL`. This crate stores string *payloads*
//! and lets the encoder pick the wire shape (see
//! [`EncodeBuffer::write_imap_string`](crate::encode::EncodeBuffer::write_imap_string)),
//! so the types here only enforce what must hold regardless of rendering.

use std::{fmt, ops::Deref};

use thiserror::Error;

use crate::utils::indicators::{is_astring_char, is_atom_char, is_text_char};

/// Error returned by the validating constructors in this module (and by the
/// construction invariants of the AST types building on them).
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum ValidationError {
    #[error("must not be empty")]
    Empty,
    #[error("invalid byte b'\\x{found:02x}' at index {position}")]
    ByteNotAllowed { found: u8, position: usize },
    #[error("duplicate key at index {position}")]
    DuplicateKey { position: usize },
    #[error("value out of range")]
    OutOfRange,
}

fn verify_bytes(value: &[u8], allowed: fn(u8) -> bool) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Some(position) = value.iter().position(|b| !allowed(*b)) {
        return Err(ValidationError::ByteNotAllowed {
            found: value[position],
            position,
        });
    }

    Ok(())
}

/// A command tag.
///
/// `tag = 1*<any ASTRING-CHAR except "+">`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag(pub(crate) String);

impl Tag {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), |b| is_astring_char(b) && b != b'+')
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    pub(crate) fn unvalidated(value: impl Into<String>) -> Self {
        let value = value.into();
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<&str> for Tag {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Tag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&[u8]> for Tag {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        // Tag bytes are a subset of ASCII, so this cannot fail.
        Ok(Self(String::from_utf8(value.to_vec()).unwrap()))
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An atom.
///
/// `atom = 1*ATOM-CHAR`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom(pub(crate) String);

impl Atom {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), is_atom_char)
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    pub(crate) fn unvalidated(value: impl Into<String>) -> Self {
        let value = value.into();
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<&str> for Atom {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Atom {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&[u8]> for Atom {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        // Atom bytes are a subset of ASCII, so this cannot fail.
        Ok(Self(String::from_utf8(value.to_vec()).unwrap()))
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An IMAP string payload.
///
/// The bytes are arbitrary; the wire shape (quoted, literal, or binary
/// literal) is chosen by the encoder according to the rendering rule.
/// A payload containing NUL can only be emitted as a binary literal, which
/// in client mode requires the peer to have advertised `BINARY`.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IString(pub(crate) Vec<u8>);

impl IString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Whether emission requires a binary literal (`~{n}`).
    pub fn needs_binary(&self) -> bool {
        self.0.contains(&0x00)
    }
}

impl fmt::Debug for IString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IString({:?})", crate::utils::escape_byte_string(&self.0))
    }
}

impl From<Vec<u8>> for IString {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for IString {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for IString {
    fn from(value: &[u8; N]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&str> for IString {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for IString {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Atom> for IString {
    fn from(value: Atom) -> Self {
        Self(value.0.into_bytes())
    }
}

impl AsRef<[u8]> for IString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for IString {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `nstring = string / nil`
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NString(pub Option<IString>);

impl NString {
    pub const NIL: NString = NString(None);

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_ref().map(|s| s.as_bytes())
    }
}

impl From<IString> for NString {
    fn from(value: IString) -> Self {
        Self(Some(value))
    }
}

impl From<&str> for NString {
    fn from(value: &str) -> Self {
        Self(Some(IString::from(value)))
    }
}

impl From<&[u8]> for NString {
    fn from(value: &[u8]) -> Self {
        Self(Some(IString::from(value)))
    }
}

impl<const N: usize> From<&[u8; N]> for NString {
    fn from(value: &[u8; N]) -> Self {
        Self(Some(IString::from(value.as_slice())))
    }
}

impl From<Option<IString>> for NString {
    fn from(value: Option<IString>) -> Self {
        Self(value)
    }
}

/// Human-readable response text.
///
/// `text = 1*TEXT-CHAR`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Text(pub(crate) String);

impl Text {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), is_text_char)
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    pub(crate) fn unvalidated(value: impl Into<String>) -> Self {
        let value = value.into();
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<&str> for Text {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Text {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `charset = atom / quoted`
///
/// Stored as a string; the encoder emits the atom form when possible and a
/// quoted string otherwise.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Charset(pub(crate) String);

impl Charset {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), is_text_char)
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    pub(crate) fn unvalidated(value: impl Into<String>) -> Self {
        let value = value.into();
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<&str> for Charset {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Charset {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Charset {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single `QUOTED-CHAR`, e.g. a mailbox hierarchy delimiter.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QuotedChar(pub(crate) char);

impl QuotedChar {
    pub fn verify(value: char) -> Result<(), ValidationError> {
        if value.is_ascii() && is_text_char(value as u8) {
            Ok(())
        } else {
            Err(ValidationError::ByteNotAllowed {
                found: if value.is_ascii() { value as u8 } else { 0xff },
                position: 0,
            })
        }
    }

    pub fn inner(&self) -> char {
        self.0
    }

    pub(crate) fn unvalidated(value: char) -> Self {
        debug_assert!(Self::verify(value).is_ok());
        Self(value)
    }
}

impl TryFrom<char> for QuotedChar {
    type Error = ValidationError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::verify(value)?;
        Ok(Self(value))
    }
}

/// A `Vec` that is guaranteed to contain at least one element, used for the
/// `1*` repetitions of the grammar.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NonEmptyVec<T>(pub(crate) Vec<T>);

impl<T> NonEmptyVec<T> {
    pub fn new(head: T) -> Self {
        Self(vec![head])
    }

    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    pub fn head(&self) -> &T {
        // The constructor guarantees at least one element.
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    pub(crate) fn unvalidated(inner: Vec<T>) -> Self {
        debug_assert!(!inner.is_empty());
        Self(inner)
    }
}

impl<T> From<T> for NonEmptyVec<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = ValidationError;

    fn try_from(inner: Vec<T>) -> Result<Self, Self::Error> {
        if inner.is_empty() {
            return Err(ValidationError::Empty);
        }

        Ok(Self(inner))
    }
}

impl<T> AsRef<[T]> for NonEmptyVec<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T> IntoIterator for NonEmptyVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NonEmptyVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A thin wrapper keeping credentials out of `Debug` output.
#[derive(Clone, Default, Eq, Hash, Ord, PartialOrd)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Expose the inner value. Use sparingly.
    pub fn declassify(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Secret<T> {
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("/* REDACTED */")
    }
}

impl<T: PartialEq> PartialEq for Secret<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag() {
        assert!(Tag::try_from("A1").is_ok());
        assert!(Tag::try_from("a.1]").is_ok());
        assert!(Tag::try_from("").is_err());
        assert!(Tag::try_from("A+").is_err());
        assert!(Tag::try_from("A 1").is_err());
    }

    #[test]
    fn test_atom() {
        assert!(Atom::try_from("NOOP").is_ok());
        assert!(Atom::try_from("LITERAL+").is_ok());
        assert!(Atom::try_from("").is_err());
        assert!(Atom::try_from("a]").is_err());
        assert!(Atom::try_from("a b").is_err());
    }

    #[test]
    fn test_text() {
        assert!(Text::try_from("LOGIN completed.").is_ok());
        assert!(Text::try_from("").is_err());
        assert!(Text::try_from("line\r\nbreak").is_err());
    }

    #[test]
    fn test_istring_needs_binary() {
        assert!(!IString::from("hello").needs_binary());
        assert!(IString::from(b"he\x00llo".as_slice()).needs_binary());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new(String::from("hunter2"));
        assert_eq!(format!("{:?}", secret), "/* REDACTED */");
        assert_eq!(secret.declassify(), "hunter2");
    }

    #[test]
    fn test_non_empty_vec() {
        assert!(NonEmptyVec::<u8>::try_from(vec![]).is_err());
        let vec = NonEmptyVec::<u8>::try_from(vec![1u8, 2]).unwrap();
        assert_eq!(vec.len(), 2);
        assert_eq!(*vec.head(), 1);
    }
}
