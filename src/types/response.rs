//! Responses sent by the server.

use std::num::NonZeroU32;

use crate::{
    core::{Atom, Charset, IString, NonEmptyVec, QuotedChar, Tag, Text, ValidationError},
    types::{
        capability::Capability,
        fetch::MessageDataItem,
        flag::{Flag, FlagNameAttribute, FlagPerm},
        id::IdParameters,
        mailbox::Mailbox,
        metadata::MetadataResponse,
        namespace::NamespaceClass,
        search::ExtendedSearchData,
        sequence::SequenceSet,
        status::StatusDataItem,
        urlauth::UrlFetchItem,
        TaggedExtValue,
    },
};

/// `greeting = "*" SP (resp-cond-auth / resp-cond-bye) CRLF`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Greeting {
    pub kind: GreetingKind,
    pub code: Option<Code>,
    pub text: Text,
}

impl Greeting {
    pub fn new(
        kind: GreetingKind,
        code: Option<Code>,
        text: impl TryInto<Text, Error = ValidationError>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            kind,
            code,
            text: text.try_into()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GreetingKind {
    /// The connection starts in the not-authenticated state.
    Ok,
    /// The connection starts pre-authenticated.
    PreAuth,
    /// The server refuses the connection.
    Bye,
}

/// Any response after the greeting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Status(Status),
    Data(Data),
    Continue(Continue),
}

/// A condition state, tagged (command completion) or untagged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Ok {
        /// `None` on untagged `* OK`.
        tag: Option<Tag>,
        code: Option<Code>,
        text: Text,
    },
    No {
        tag: Option<Tag>,
        code: Option<Code>,
        text: Text,
    },
    Bad {
        tag: Option<Tag>,
        code: Option<Code>,
        text: Text,
    },
    /// Always untagged.
    Bye { code: Option<Code>, text: Text },
}

impl Status {
    pub fn ok(
        tag: Option<Tag>,
        code: Option<Code>,
        text: impl TryInto<Text, Error = ValidationError>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Ok {
            tag,
            code,
            text: text.try_into()?,
        })
    }

    pub fn no(
        tag: Option<Tag>,
        code: Option<Code>,
        text: impl TryInto<Text, Error = ValidationError>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::No {
            tag,
            code,
            text: text.try_into()?,
        })
    }

    pub fn bad(
        tag: Option<Tag>,
        code: Option<Code>,
        text: impl TryInto<Text, Error = ValidationError>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Bad {
            tag,
            code,
            text: text.try_into()?,
        })
    }
}

/// `continue-req = "+" SP (resp-text / base64) CRLF`
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Continue {
    Basic { code: Option<Code>, text: Text },
    Base64(Vec<u8>),
}

impl Continue {
    pub fn basic(
        code: Option<Code>,
        text: impl TryInto<Text, Error = ValidationError>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Basic {
            code,
            text: text.try_into()?,
        })
    }
}

/// `resp-text-code`
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Code {
    Alert,
    /// `BADCHARSET` with the charsets the server does accept.
    BadCharset { allowed: Vec<Charset> },
    Capability(NonEmptyVec<Capability>),
    Parse,
    PermanentFlags(Vec<FlagPerm>),
    ReadOnly,
    ReadWrite,
    TryCreate,
    UidNext(NonZeroU32),
    UidValidity(NonZeroU32),
    Unseen(NonZeroU32),
    /// `HIGHESTMODSEQ` (RFC 7162)
    HighestModSeq(u64),
    /// `NOMODSEQ` (RFC 7162)
    NoModSeq,
    /// `MODIFIED` (RFC 7162)
    Modified(SequenceSet),
    /// Any other code: the atom plus its raw arguments, verbatim.
    Other {
        atom: Atom,
        arguments: Option<Vec<u8>>,
    },
}

/// Untagged server data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Data {
    Capability(NonEmptyVec<Capability>),
    List {
        items: Vec<FlagNameAttribute>,
        delimiter: Option<QuotedChar>,
        mailbox: Mailbox,
        /// `mbox-list-extended` items (RFC 5258), preserved verbatim.
        extensions: Vec<(IString, TaggedExtValue)>,
    },
    Lsub {
        items: Vec<FlagNameAttribute>,
        delimiter: Option<QuotedChar>,
        mailbox: Mailbox,
    },
    Status {
        mailbox: Mailbox,
        items: Vec<StatusDataItem>,
    },
    Search {
        seqs: Vec<NonZeroU32>,
        /// `(MODSEQ n)` suffix (RFC 7162)
        highest_modseq: Option<u64>,
    },
    /// `ESEARCH` (RFC 4731)
    ExtendedSearch(ExtendedSearchData),
    Flags(Vec<Flag>),
    Exists(u32),
    Recent(u32),
    Expunge(NonZeroU32),
    Fetch {
        seq: NonZeroU32,
        items: NonEmptyVec<MessageDataItem>,
    },
    /// `ENABLED` (RFC 5161)
    Enabled { capabilities: Vec<Capability> },
    /// `ID` (RFC 2971)
    Id { parameters: IdParameters },
    /// `NAMESPACE` (RFC 2342)
    Namespace {
        personal: NamespaceClass,
        other: NamespaceClass,
        shared: NamespaceClass,
    },
    /// `METADATA` (RFC 5464)
    Metadata {
        mailbox: Mailbox,
        items: MetadataResponse,
    },
    /// `GENURLAUTH` (RFC 4467)
    GenUrlAuth(NonEmptyVec<IString>),
    /// `URLFETCH` (RFC 4467)
    UrlFetch(NonEmptyVec<UrlFetchItem>),
}

impl Data {
    pub fn expunge(seq: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(seq)
            .map(Self::Expunge)
            .ok_or(ValidationError::OutOfRange)
    }

    pub fn fetch(
        seq: u32,
        items: Vec<MessageDataItem>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Fetch {
            seq: NonZeroU32::new(seq).ok_or(ValidationError::OutOfRange)?,
            items: NonEmptyVec::try_from(items)?,
        })
    }
}
