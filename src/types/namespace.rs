//! NAMESPACE (RFC 2342) types.

use crate::core::{IString, NonEmptyVec, QuotedChar};

/// One class of namespaces (personal, other users', shared): `NIL` or a
/// non-empty list of descriptors.
pub type NamespaceClass = Option<NonEmptyVec<NamespaceDescription>>;

/// `namespace-descr = "(" string SP (DQUOTE QUOTED-CHAR DQUOTE / nil)
///                    *(namespace-response-extension) ")"`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NamespaceDescription {
    pub prefix: IString,
    pub delimiter: Option<QuotedChar>,
    pub extensions: Vec<NamespaceExtension>,
}

/// `namespace-response-extension = SP string SP "(" string *(SP string) ")"`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NamespaceExtension {
    pub label: IString,
    pub values: NonEmptyVec<IString>,
}
