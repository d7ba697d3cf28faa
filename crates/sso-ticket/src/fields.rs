//! Tag to field-name projection.

use std::collections::BTreeMap;
use std::fmt;

use crate::record::InfoUnit;

/// Tags with a known meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    User,
    CreateClient,
    CreateName,
    CreateTime,
    ValidTime,
    Rfc,
    ValidTimeMin,
    Flags,
    Language,
    UserUtf,
    CreateClientUtf,
    CreateNameUtf,
    CreateTimeUtf,
    LanguageUtf,
    AuthType,
    AuthScheme,
    Signature,
}

const TAG_TABLE: [(u8, FieldName); 17] = [
    (1, FieldName::User),
    (2, FieldName::CreateClient),
    (3, FieldName::CreateName),
    (4, FieldName::CreateTime),
    (5, FieldName::ValidTime),
    (6, FieldName::Rfc),
    (7, FieldName::ValidTimeMin),
    (8, FieldName::Flags),
    (9, FieldName::Language),
    (10, FieldName::UserUtf),
    (11, FieldName::CreateClientUtf),
    (12, FieldName::CreateNameUtf),
    (13, FieldName::CreateTimeUtf),
    (14, FieldName::LanguageUtf),
    (15, FieldName::AuthType),
    (136, FieldName::AuthScheme),
    (255, FieldName::Signature),
];

/// Tag of the info unit carrying the PKCS#7 signature.
pub const SIGNATURE_TAG: u8 = 255;

impl FieldName {
    pub const ALL: [FieldName; 17] = {
        let mut all = [FieldName::User; 17];
        let mut i = 0;
        while i < TAG_TABLE.len() {
            all[i] = TAG_TABLE[i].1;
            i += 1;
        }
        all
    };

    pub fn from_tag(tag: u8) -> Option<Self> {
        TAG_TABLE
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, name)| *name)
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::User => 1,
            Self::CreateClient => 2,
            Self::CreateName => 3,
            Self::CreateTime => 4,
            Self::ValidTime => 5,
            Self::Rfc => 6,
            Self::ValidTimeMin => 7,
            Self::Flags => 8,
            Self::Language => 9,
            Self::UserUtf => 10,
            Self::CreateClientUtf => 11,
            Self::CreateNameUtf => 12,
            Self::CreateTimeUtf => 13,
            Self::LanguageUtf => 14,
            Self::AuthType => 15,
            Self::AuthScheme => 136,
            Self::Signature => SIGNATURE_TAG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::CreateClient => "create_client",
            Self::CreateName => "create_name",
            Self::CreateTime => "create_time",
            Self::ValidTime => "valid_time",
            Self::Rfc => "rfc",
            Self::ValidTimeMin => "valid_time_min",
            Self::Flags => "flags",
            Self::Language => "language",
            Self::UserUtf => "user_utf",
            Self::CreateClientUtf => "create_client_utf",
            Self::CreateNameUtf => "create_name_utf",
            Self::CreateTimeUtf => "create_time_utf",
            Self::LanguageUtf => "language_utf",
            Self::AuthType => "auth_type",
            Self::AuthScheme => "authscheme",
            Self::Signature => "signature",
        }
    }

    /// Fields whose content is always UTF-8 regardless of the code page.
    pub fn is_utf8(self) -> bool {
        matches!(
            self,
            Self::UserUtf
                | Self::CreateClientUtf
                | Self::CreateNameUtf
                | Self::CreateTimeUtf
                | Self::LanguageUtf
        )
    }

    /// Fields holding binary values rather than text.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::ValidTime | Self::ValidTimeMin | Self::Flags | Self::Signature
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key of the field map: a resolved name, or the raw tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Known(FieldName),
    Unknown(u8),
}

impl FieldKey {
    pub fn from_tag(tag: u8) -> Self {
        FieldName::from_tag(tag).map_or(Self::Unknown(tag), Self::Known)
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::Known(name) => name.tag(),
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<FieldName> for FieldKey {
    fn from(name: FieldName) -> Self {
        Self::Known(name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => name.fmt(f),
            Self::Unknown(tag) => write!(f, "{tag}"),
        }
    }
}

/// Build the field map from ordered info units.
///
/// A tag that occurs more than once keeps its last content here; every
/// occurrence stays available in the unit list.
pub fn project(units: &[InfoUnit]) -> BTreeMap<FieldKey, Vec<u8>> {
    units
        .iter()
        .map(|unit| (unit.name(), unit.content.clone()))
        .collect()
}
