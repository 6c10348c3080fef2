//! Flag parsing.

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::map,
    multi::separated_list0,
    sequence::{delimited, preceded},
};

use crate::{
    parse::{
        core::{atom, sp},
        WireResult,
    },
    types::flag::{Flag, FlagFetch, FlagNameAttribute, FlagPerm},
};

/// `flag = "\Answered" / "\Flagged" / "\Deleted" / "\Seen" / "\Draft" /
///         flag-keyword / flag-extension`
pub(crate) fn flag(input: &[u8]) -> WireResult<Flag> {
    alt((
        map(preceded(tag(b"\\"), atom), Flag::system),
        map(atom, Flag::Keyword),
    ))(input)
}

/// `flag-list = "(" [flag *(SP flag)] ")"`
pub(crate) fn flag_list(input: &[u8]) -> WireResult<Vec<Flag>> {
    delimited(tag(b"("), separated_list0(sp, flag), tag(b")"))(input)
}

/// `flag-fetch = flag / "\Recent"`
pub(crate) fn flag_fetch(input: &[u8]) -> WireResult<FlagFetch> {
    // `\Recent` must win over the flag-extension interpretation.
    alt((
        map(tag_no_case(b"\\Recent"), |_| FlagFetch::Recent),
        map(flag, FlagFetch::Flag),
    ))(input)
}

/// `flag-perm = flag / "\*"`
pub(crate) fn flag_perm(input: &[u8]) -> WireResult<FlagPerm> {
    alt((
        map(tag(b"\\*"), |_| FlagPerm::Asterisk),
        map(flag, FlagPerm::Flag),
    ))(input)
}

/// `mbx-list-flags` element: `"\" atom`
pub(crate) fn flag_name_attribute(input: &[u8]) -> WireResult<FlagNameAttribute> {
    map(preceded(tag(b"\\"), atom), FlagNameAttribute::from_atom)(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Atom;

    #[test]
    fn test_flag() {
        let (_, value) = flag(b"\\Seen ").unwrap();
        assert_eq!(value, Flag::Seen);

        let (_, value) = flag(b"\\answered ").unwrap();
        assert_eq!(value, Flag::Answered);

        let (_, value) = flag(b"$Forwarded ").unwrap();
        assert_eq!(value, Flag::Keyword(Atom::try_from("$Forwarded").unwrap()));

        let (_, value) = flag(b"\\XNew ").unwrap();
        assert_eq!(value, Flag::Extension(Atom::try_from("XNew").unwrap()));
    }

    #[test]
    fn test_flag_list() {
        let (_, value) = flag_list(b"() ").unwrap();
        assert!(value.is_empty());

        let (_, value) = flag_list(b"(\\Seen \\Deleted) ").unwrap();
        assert_eq!(value, vec![Flag::Seen, Flag::Deleted]);
    }

    #[test]
    fn test_flag_fetch_recent() {
        let (_, value) = flag_fetch(b"\\Recent ").unwrap();
        assert_eq!(value, FlagFetch::Recent);
    }

    #[test]
    fn test_flag_perm_asterisk() {
        let (_, value) = flag_perm(b"\\* ").unwrap();
        assert_eq!(value, FlagPerm::Asterisk);
    }
}
