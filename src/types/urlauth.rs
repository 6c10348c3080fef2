//! URLAUTH (RFC 4467) and URLFETCH types.
//!
//! URLs are carried as opaque astring bytes; this crate does not interpret
//! `imapurl` syntax.

use std::fmt;

use crate::core::{Atom, IString, NString};

/// `mechanism = "INTERNAL" / tagged-ext-label`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum UrlMechanism {
    Internal,
    Other(Atom),
}

impl UrlMechanism {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal => "INTERNAL",
            Self::Other(atom) => atom.inner(),
        }
    }
}

impl From<Atom> for UrlMechanism {
    fn from(atom: Atom) -> Self {
        if atom.inner().eq_ignore_ascii_case("INTERNAL") {
            Self::Internal
        } else {
            Self::Other(atom)
        }
    }
}

impl fmt::Display for UrlMechanism {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `url-rump SP mechanism` pair of a GENURLAUTH command.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UrlRump {
    pub url: IString,
    pub mechanism: UrlMechanism,
}

/// One `url SP nstring` pair of an untagged URLFETCH response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UrlFetchItem {
    pub url: IString,
    pub data: NString,
}
