//! The FETCH `BODY`/`BODYSTRUCTURE` tree.

use crate::{
    core::{IString, NString, NonEmptyVec},
    types::envelope::Envelope,
};

/// `body = "(" (body-type-1part / body-type-mpart) ")"`
///
/// A recursive value type: single parts are leaves, multiparts own their
/// children.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum BodyStructure {
    /// `body-type-1part = (body-type-basic / body-type-msg / body-type-text)
    ///                    [SP body-ext-1part]`
    Single {
        body: Body,
        extension_data: Option<SinglePartExtension>,
    },
    /// `body-type-mpart = 1*body SP media-subtype [SP body-ext-mpart]`
    Multi {
        bodies: NonEmptyVec<BodyStructure>,
        subtype: IString,
        extension_data: Option<MultiPartExtension>,
    },
}

/// The non-extensible part of a single-part body.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Body {
    pub basic: BasicFields,
    pub specific: SpecificFields,
}

/// `body-fields = body-fld-param SP body-fld-id SP body-fld-desc SP
///                body-fld-enc SP body-fld-octets`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BasicFields {
    /// `body-fld-param`: `NIL` when empty.
    pub parameter_list: Vec<(IString, IString)>,
    pub id: NString,
    pub description: NString,
    pub content_transfer_encoding: IString,
    pub octets: u32,
}

/// What distinguishes basic, `MESSAGE/RFC822`, and `TEXT/*` parts.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SpecificFields {
    /// `body-type-basic = media-basic SP body-fields`
    Basic {
        r#type: IString,
        subtype: IString,
    },
    /// `body-type-msg = media-message SP body-fields SP envelope SP body
    ///                  SP body-fld-lines`
    Message {
        envelope: Box<Envelope>,
        body_structure: Box<BodyStructure>,
        number_of_lines: u32,
    },
    /// `body-type-text = media-text SP body-fields SP body-fld-lines`
    Text {
        subtype: IString,
        number_of_lines: u32,
    },
}

/// `body-ext-1part = body-fld-md5 [SP body-fld-dsp [SP body-fld-lang
///                   [SP body-fld-loc *(SP body-extension)]]]`
///
/// The trailing-optional chain of the grammar is modelled as nested `tail`
/// options: a field can only be present when all fields before it are.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SinglePartExtension {
    pub md5: NString,
    pub tail: Option<Disposition>,
}

/// `body-ext-mpart = body-fld-param [SP body-fld-dsp [SP body-fld-lang
///                   [SP body-fld-loc *(SP body-extension)]]]`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MultiPartExtension {
    pub parameter_list: Vec<(IString, IString)>,
    pub tail: Option<Disposition>,
}

/// `body-fld-dsp = "(" string SP body-fld-param ")" / nil`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Disposition {
    pub disposition: Option<(IString, Vec<(IString, IString)>)>,
    pub tail: Option<Language>,
}

/// `body-fld-lang = nstring / "(" string *(SP string) ")"`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Language {
    pub languages: Vec<IString>,
    pub tail: Option<Location>,
}

/// `body-fld-loc = nstring`, plus any trailing `body-extension`s.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    pub location: NString,
    pub extensions: Vec<BodyExtension>,
}

/// `body-extension = nstring / number / "(" body-extension
///                   *(SP body-extension) ")"`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum BodyExtension {
    NString(NString),
    Number(u32),
    List(NonEmptyVec<BodyExtension>),
}
