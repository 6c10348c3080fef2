//! Authentication-related types.

use std::fmt;

use crate::core::{Atom, Secret};

/// `auth-type = atom` (defined by SASL)
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AuthMechanism {
    Plain,
    Login,
    XOAuth2,
    Other(Atom),
}

impl AuthMechanism {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::XOAuth2 => "XOAUTH2",
            Self::Other(atom) => atom.inner(),
        }
    }
}

impl From<Atom> for AuthMechanism {
    fn from(atom: Atom) -> Self {
        match atom.inner().to_ascii_uppercase().as_str() {
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            "XOAUTH2" => Self::XOAuth2,
            _ => Self::Other(atom),
        }
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line sent by the client during an `AUTHENTICATE` exchange.
///
/// `authenticate-data = base64 / "*"`
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthenticateData {
    /// Continue the exchange with the given (decoded) payload.
    Continue(Secret<Vec<u8>>),
    /// Abort the exchange.
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_from_atom_is_case_insensitive() {
        let atom = Atom::try_from("plain").unwrap();
        assert_eq!(AuthMechanism::from(atom), AuthMechanism::Plain);

        let atom = Atom::try_from("SCRAM-SHA-1").unwrap();
        assert!(matches!(AuthMechanism::from(atom), AuthMechanism::Other(_)));
    }
}
