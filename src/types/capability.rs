//! Capability tokens and the capability set consulted by the encoder.

use std::fmt;

use crate::{core::Atom, types::auth::AuthMechanism};

/// A capability advertised by the server.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    Imap4Rev1,
    Auth(AuthMechanism),
    LoginDisabled,
    StartTls,
    Idle,
    SaslIr,
    Enable,
    /// `LITERAL+` (RFC 7888): non-synchronizing literals of any size.
    LiteralPlus,
    /// `LITERAL-` (RFC 7888): non-synchronizing literals up to 4096 bytes.
    LiteralMinus,
    Binary,
    CondStore,
    ESearch,
    Id,
    ListExtended,
    Metadata,
    MetadataServer,
    Move,
    Namespace,
    UrlAuth,
    Unselect,
    Other(Atom),
}

impl From<Atom> for Capability {
    fn from(atom: Atom) -> Self {
        let upper = atom.inner().to_ascii_uppercase();

        if let Some(mechanism) = upper.strip_prefix("AUTH=") {
            // The mechanism sub-atom is valid whenever the full atom was.
            let mechanism = Atom::unvalidated(mechanism.to_owned());
            return Self::Auth(AuthMechanism::from(mechanism));
        }

        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "LOGINDISABLED" => Self::LoginDisabled,
            "STARTTLS" => Self::StartTls,
            "IDLE" => Self::Idle,
            "SASL-IR" => Self::SaslIr,
            "ENABLE" => Self::Enable,
            "LITERAL+" => Self::LiteralPlus,
            "LITERAL-" => Self::LiteralMinus,
            "BINARY" => Self::Binary,
            "CONDSTORE" => Self::CondStore,
            "ESEARCH" => Self::ESearch,
            "ID" => Self::Id,
            "LIST-EXTENDED" => Self::ListExtended,
            "METADATA" => Self::Metadata,
            "METADATA-SERVER" => Self::MetadataServer,
            "MOVE" => Self::Move,
            "NAMESPACE" => Self::Namespace,
            "URLAUTH" => Self::UrlAuth,
            "UNSELECT" => Self::Unselect,
            _ => Self::Other(atom),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Imap4Rev1 => f.write_str("IMAP4REV1"),
            Self::Auth(mechanism) => write!(f, "AUTH={}", mechanism),
            Self::LoginDisabled => f.write_str("LOGINDISABLED"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::Idle => f.write_str("IDLE"),
            Self::SaslIr => f.write_str("SASL-IR"),
            Self::Enable => f.write_str("ENABLE"),
            Self::LiteralPlus => f.write_str("LITERAL+"),
            Self::LiteralMinus => f.write_str("LITERAL-"),
            Self::Binary => f.write_str("BINARY"),
            Self::CondStore => f.write_str("CONDSTORE"),
            Self::ESearch => f.write_str("ESEARCH"),
            Self::Id => f.write_str("ID"),
            Self::ListExtended => f.write_str("LIST-EXTENDED"),
            Self::Metadata => f.write_str("METADATA"),
            Self::MetadataServer => f.write_str("METADATA-SERVER"),
            Self::Move => f.write_str("MOVE"),
            Self::Namespace => f.write_str("NAMESPACE"),
            Self::UrlAuth => f.write_str("URLAUTH"),
            Self::Unselect => f.write_str("UNSELECT"),
            Self::Other(atom) => f.write_str(atom.inner()),
        }
    }
}

/// The set of capabilities the peer has advertised.
///
/// Insertion-ordered and deduplicated. The encoder consults this set when
/// choosing literal forms and when gating binary literals.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Capabilities(Vec<Capability>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability) {
        if !self.0.contains(&capability) {
            self.0.push(capability);
        }
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capability> {
        self.0.iter()
    }

    /// Replace the whole set, e.g. after a `CAPABILITY` response.
    pub fn replace(&mut self, capabilities: impl IntoIterator<Item = Capability>) {
        self.0.clear();
        self.extend(capabilities);
    }

    pub fn literal_plus(&self) -> bool {
        self.contains(&Capability::LiteralPlus)
    }

    pub fn literal_minus(&self) -> bool {
        self.contains(&Capability::LiteralMinus)
    }

    pub fn binary(&self) -> bool {
        self.contains(&Capability::Binary)
    }
}

impl Extend<Capability> for Capabilities {
    fn extend<I: IntoIterator<Item = Capability>>(&mut self, iter: I) {
        for capability in iter {
            self.insert(capability);
        }
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut capabilities = Self::new();
        capabilities.extend(iter);
        capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_atom() {
        let tests = [
            ("IMAP4rev1", Capability::Imap4Rev1),
            ("literal+", Capability::LiteralPlus),
            ("LITERAL-", Capability::LiteralMinus),
            ("auth=plain", Capability::Auth(AuthMechanism::Plain)),
            ("CONDSTORE", Capability::CondStore),
        ];

        for (input, expected) in tests {
            let atom = Atom::try_from(input).unwrap();
            assert_eq!(Capability::from(atom), expected);
        }

        let atom = Atom::try_from("XDOVECOT").unwrap();
        assert_eq!(Capability::from(atom.clone()), Capability::Other(atom));
    }

    #[test]
    fn test_set_deduplicates_and_keeps_order() {
        let mut set = Capabilities::new();
        set.insert(Capability::Imap4Rev1);
        set.insert(Capability::LiteralPlus);
        set.insert(Capability::Imap4Rev1);

        assert_eq!(
            set.iter().cloned().collect::<Vec<_>>(),
            vec![Capability::Imap4Rev1, Capability::LiteralPlus],
        );
        assert!(set.literal_plus());
        assert!(!set.binary());
    }
}
