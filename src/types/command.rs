//! Commands sent by the client.

use crate::{
    core::{Charset, IString, NonEmptyVec, Secret, Tag, ValidationError},
    types::{
        auth::AuthMechanism,
        capability::Capability,
        datetime::DateTime,
        fetch::MessageDataItemName,
        flag::{Flag, StoreResponse, StoreType},
        id::IdParameters,
        mailbox::{ListMailbox, Mailbox},
        metadata::{EntryValue, GetMetadataOption, MetadataEntry},
        search::{SearchKey, SearchReturnOption},
        sequence::SequenceSet,
        status::StatusDataItemName,
        urlauth::{UrlMechanism, UrlRump},
        TaggedExtension,
    },
};

/// `command = tag SP command-body CRLF`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    pub tag: Tag,
    pub body: CommandBody,
}

impl Command {
    pub fn new(tag: impl TryInto<Tag, Error = ValidationError>, body: CommandBody) -> Result<Self, ValidationError> {
        Ok(Self {
            tag: tag.try_into()?,
            body,
        })
    }
}

/// Every command of IMAP4rev1 plus the supported extensions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandBody {
    // -- any state ---------------------------------------------------------
    Capability,
    Noop,
    Logout,
    /// `ID` (RFC 2971). An empty parameter list encodes as `NIL`.
    Id {
        parameters: IdParameters,
    },

    // -- not authenticated -------------------------------------------------
    StartTls,
    Authenticate {
        mechanism: AuthMechanism,
        /// SASL-IR initial response (raw, not base64-encoded).
        initial_response: Option<Secret<Vec<u8>>>,
    },
    Login {
        username: IString,
        password: Secret<IString>,
    },

    // -- authenticated -----------------------------------------------------
    Select {
        mailbox: Mailbox,
        parameters: Vec<SelectParameter>,
    },
    Examine {
        mailbox: Mailbox,
        parameters: Vec<SelectParameter>,
    },
    Create {
        mailbox: Mailbox,
        parameters: Vec<TaggedExtension>,
    },
    Delete {
        mailbox: Mailbox,
    },
    Rename {
        from: Mailbox,
        to: Mailbox,
        parameters: Vec<TaggedExtension>,
    },
    Subscribe {
        mailbox: Mailbox,
    },
    Unsubscribe {
        mailbox: Mailbox,
    },
    /// `LIST`, including the LIST-EXTENDED (RFC 5258) form.
    List {
        selection_options: Vec<ListSelectionOption>,
        reference: Mailbox,
        patterns: NonEmptyVec<ListMailbox>,
        return_options: Vec<ListReturnOption>,
    },
    Lsub {
        reference: Mailbox,
        pattern: ListMailbox,
    },
    Status {
        mailbox: Mailbox,
        item_names: Vec<StatusDataItemName>,
    },
    /// `APPEND`, including the MULTIAPPEND (RFC 3502) form.
    Append {
        mailbox: Mailbox,
        messages: NonEmptyVec<AppendMessage>,
    },
    Idle,
    Enable {
        capabilities: NonEmptyVec<Capability>,
    },
    /// `NAMESPACE` (RFC 2342)
    Namespace,
    GetMetadata {
        options: Vec<GetMetadataOption>,
        mailbox: Mailbox,
        entries: NonEmptyVec<MetadataEntry>,
    },
    SetMetadata {
        mailbox: Mailbox,
        entries: NonEmptyVec<EntryValue>,
    },
    UrlFetch {
        urls: NonEmptyVec<IString>,
    },
    GenUrlAuth {
        rumps: NonEmptyVec<UrlRump>,
    },
    ResetKey {
        /// `None` removes all mailbox access keys of the user.
        mailbox: Option<(Mailbox, Vec<UrlMechanism>)>,
    },

    // -- selected ----------------------------------------------------------
    Check,
    Close,
    Expunge,
    Search {
        return_options: Vec<SearchReturnOption>,
        charset: Option<Charset>,
        criteria: NonEmptyVec<SearchKey>,
        uid: bool,
    },
    Fetch {
        sequence_set: SequenceSet,
        items: Vec<MessageDataItemName>,
        modifiers: Vec<FetchModifier>,
        uid: bool,
    },
    Store {
        sequence_set: SequenceSet,
        kind: StoreType,
        response: StoreResponse,
        flags: Vec<Flag>,
        modifiers: Vec<StoreModifier>,
        uid: bool,
    },
    Copy {
        sequence_set: SequenceSet,
        mailbox: Mailbox,
        uid: bool,
    },
    /// `MOVE` (RFC 6851)
    Move {
        sequence_set: SequenceSet,
        mailbox: Mailbox,
        uid: bool,
    },
}

impl CommandBody {
    pub fn login(
        username: impl Into<IString>,
        password: impl Into<IString>,
    ) -> Self {
        Self::Login {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    pub fn select(mailbox: impl TryInto<Mailbox, Error = ValidationError>) -> Result<Self, ValidationError> {
        Ok(Self::Select {
            mailbox: mailbox.try_into()?,
            parameters: Vec::new(),
        })
    }

    pub fn fetch(
        sequence_set: impl TryInto<SequenceSet, Error = ValidationError>,
        items: Vec<MessageDataItemName>,
        uid: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Fetch {
            sequence_set: sequence_set.try_into()?,
            items,
            modifiers: Vec::new(),
            uid,
        })
    }

    pub fn search(criteria: NonEmptyVec<SearchKey>, uid: bool) -> Self {
        Self::Search {
            return_options: Vec::new(),
            charset: None,
            criteria,
            uid,
        }
    }

    pub fn append(
        mailbox: impl TryInto<Mailbox, Error = ValidationError>,
        message: AppendMessage,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Append {
            mailbox: mailbox.try_into()?,
            messages: NonEmptyVec::new(message),
        })
    }
}

/// One message of an APPEND command.
///
/// `append-message = [SP flag-list] [SP date-time] SP literal`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppendMessage {
    pub flags: Vec<Flag>,
    pub date: Option<DateTime>,
    /// The raw message bytes. Rendered as a literal; as a binary literal
    /// when the bytes contain NUL (requires `BINARY`).
    pub data: Vec<u8>,
}

/// `select-param` (RFC 4466 / RFC 7162)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectParameter {
    /// `CONDSTORE` (RFC 7162)
    CondStore,
    Other(TaggedExtension),
}

/// `list-select-opt` (RFC 5258)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListSelectionOption {
    Subscribed,
    Remote,
    RecursiveMatch,
    Other(TaggedExtension),
}

/// `return-option` (RFC 5258)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListReturnOption {
    Subscribed,
    Children,
    Other(TaggedExtension),
}

/// `fetch-modifier` (RFC 4466 / RFC 7162)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchModifier {
    /// `CHANGEDSINCE` (RFC 7162)
    ChangedSince(u64),
    Other(TaggedExtension),
}

/// `store-modifier` (RFC 4466 / RFC 7162)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreModifier {
    /// `UNCHANGEDSINCE` (RFC 7162)
    UnchangedSince(u64),
    Other(TaggedExtension),
}

/// The `DONE` line terminating an IDLE (RFC 2177).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IdleDone;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new_validates_tag() {
        assert!(Command::new("A1", CommandBody::Noop).is_ok());
        assert!(Command::new("A 1", CommandBody::Noop).is_err());
        assert!(Command::new("", CommandBody::Noop).is_err());
    }
}
