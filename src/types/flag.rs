//! Message flags and mailbox name attributes.

use std::fmt;

use crate::core::Atom;

/// `flag = "\Answered" / "\Flagged" / "\Deleted" / "\Seen" / "\Draft" /
///         flag-keyword / flag-extension`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Flag {
    Answered,
    Flagged,
    Deleted,
    Seen,
    Draft,
    /// `flag-keyword = atom`
    Keyword(Atom),
    /// `flag-extension = "\" atom`
    Extension(Atom),
}

impl Flag {
    /// Interpret a backslash-prefixed flag name (without the backslash).
    pub(crate) fn system(atom: Atom) -> Self {
        match atom.inner().to_ascii_uppercase().as_str() {
            "ANSWERED" => Self::Answered,
            "FLAGGED" => Self::Flagged,
            "DELETED" => Self::Deleted,
            "SEEN" => Self::Seen,
            "DRAFT" => Self::Draft,
            _ => Self::Extension(atom),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Answered => f.write_str("\\Answered"),
            Self::Flagged => f.write_str("\\Flagged"),
            Self::Deleted => f.write_str("\\Deleted"),
            Self::Seen => f.write_str("\\Seen"),
            Self::Draft => f.write_str("\\Draft"),
            Self::Keyword(atom) => f.write_str(atom.inner()),
            Self::Extension(atom) => write!(f, "\\{}", atom),
        }
    }
}

/// A flag as it may appear in a FETCH response, where the `\Recent`
/// pseudo-flag is also possible.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagFetch {
    Flag(Flag),
    Recent,
}

/// A flag as it may appear in a `PERMANENTFLAGS` response code, where the
/// `\*` wildcard is also possible.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagPerm {
    Flag(Flag),
    Asterisk,
}

/// `mbx-list-flags`, the name attributes of a LIST/LSUB response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagNameAttribute {
    Noinferiors,
    Noselect,
    Marked,
    Unmarked,
    /// `LIST-EXTENDED` selection attributes and other extensions.
    Extension(Atom),
}

impl FlagNameAttribute {
    pub(crate) fn from_atom(atom: Atom) -> Self {
        match atom.inner().to_ascii_uppercase().as_str() {
            "NOINFERIORS" => Self::Noinferiors,
            "NOSELECT" => Self::Noselect,
            "MARKED" => Self::Marked,
            "UNMARKED" => Self::Unmarked,
            _ => Self::Extension(atom),
        }
    }
}

impl fmt::Display for FlagNameAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Noinferiors => f.write_str("\\Noinferiors"),
            Self::Noselect => f.write_str("\\Noselect"),
            Self::Marked => f.write_str("\\Marked"),
            Self::Unmarked => f.write_str("\\Unmarked"),
            Self::Extension(atom) => write!(f, "\\{}", atom),
        }
    }
}

/// How a STORE command changes the flag set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreType {
    /// `FLAGS`
    Replace,
    /// `+FLAGS`
    Add,
    /// `-FLAGS`
    Remove,
}

/// Whether the server should answer a STORE with untagged FETCHes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreResponse {
    Answer,
    /// `.SILENT`
    Silent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_flags_are_case_insensitive() {
        let atom = Atom::try_from("seen").unwrap();
        assert_eq!(Flag::system(atom), Flag::Seen);

        let atom = Atom::try_from("X-Custom").unwrap();
        assert_eq!(Flag::system(atom.clone()), Flag::Extension(atom));
    }

    #[test]
    fn test_display() {
        assert_eq!(Flag::Seen.to_string(), "\\Seen");
        assert_eq!(
            Flag::Keyword(Atom::try_from("$Forwarded").unwrap()).to_string(),
            "$Forwarded"
        );
        assert_eq!(
            Flag::Extension(Atom::try_from("X-Custom").unwrap()).to_string(),
            "\\X-Custom"
        );
    }
}
