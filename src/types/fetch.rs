//! FETCH attributes: the names a client may request and the values a server
//! answers with, plus body section specifiers.

use std::num::NonZeroU32;

use crate::{
    core::{IString, NString, NonEmptyVec},
    types::{body::BodyStructure, datetime::DateTime, envelope::Envelope, flag::FlagFetch},
};

/// `section-part = nz-number *("." nz-number)` — a path into the MIME tree.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Part(pub NonEmptyVec<NonZeroU32>);

/// `section = "[" [section-spec] "]"`
///
/// `None` in the surrounding `Option<Section>` denotes the empty `[]`
/// (the entire message).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    /// `1.2.3`
    Part(Part),
    /// `[1.2.3.]HEADER`
    Header(Option<Part>),
    /// `[1.2.3.]HEADER.FIELDS (..)`
    HeaderFields(Option<Part>, NonEmptyVec<IString>),
    /// `[1.2.3.]HEADER.FIELDS.NOT (..)`
    HeaderFieldsNot(Option<Part>, NonEmptyVec<IString>),
    /// `[1.2.3.]TEXT`
    Text(Option<Part>),
    /// `1.2.3.MIME`
    Mime(Part),
}

/// `<offset.length>` — the partial byte range of a FETCH request.
/// The length must be at least 1.
pub type Partial = (u32, NonZeroU32);

/// `fetch-att`, the attribute names of a FETCH command.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MessageDataItemName {
    /// `BODY` (the non-extensible structure)
    Body,
    /// `BODY[section]<partial>` / `BODY.PEEK[..]`
    BodyExt {
        section: Option<Section>,
        partial: Option<Partial>,
        peek: bool,
    },
    BodyStructure,
    Envelope,
    Flags,
    InternalDate,
    Rfc822,
    Rfc822Header,
    Rfc822Size,
    Rfc822Text,
    Uid,
    /// `BINARY[part]<partial>` / `BINARY.PEEK[..]` (RFC 3516)
    Binary {
        section: Vec<NonZeroU32>,
        partial: Option<Partial>,
        peek: bool,
    },
    /// `BINARY.SIZE[part]` (RFC 3516)
    BinarySize { section: Vec<NonZeroU32> },
    /// `MODSEQ` (RFC 7162)
    ModSeq,
}

/// `msg-att`, one attribute/value of a FETCH response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MessageDataItem {
    Body(BodyStructure),
    /// `BODY[section]<origin> nstring`
    BodyExt {
        section: Option<Section>,
        origin: Option<u32>,
        data: NString,
    },
    BodyStructure(BodyStructure),
    Envelope(Envelope),
    Flags(Vec<FlagFetch>),
    InternalDate(DateTime),
    Rfc822(NString),
    Rfc822Header(NString),
    Rfc822Size(u32),
    Rfc822Text(NString),
    Uid(NonZeroU32),
    /// `BINARY[part] (nstring / literal8)`
    Binary {
        section: Vec<NonZeroU32>,
        data: NString,
    },
    BinarySize {
        section: Vec<NonZeroU32>,
        size: u32,
    },
    /// `MODSEQ (n)`
    ModSeq(u64),
}

/// The canonical expansions of the FETCH macros; the encoder renders an
/// attribute list equal to one of these as the macro keyword.
pub(crate) mod macros {
    use super::MessageDataItemName::{self, *};

    pub(crate) const FAST: &[MessageDataItemName] = &[Flags, InternalDate, Rfc822Size];
    pub(crate) const ALL: &[MessageDataItemName] = &[Flags, InternalDate, Rfc822Size, Envelope];
    pub(crate) const FULL: &[MessageDataItemName] =
        &[Flags, InternalDate, Rfc822Size, Envelope, Body];
}
