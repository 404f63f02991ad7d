use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Integer code used for URL-kind records in the shared region.
pub const URL_KIND_CODE: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharedMediaType {
    #[default]
    Url,
}

impl SharedMediaType {
    pub const fn code(self) -> i64 {
        match self {
            SharedMediaType::Url => URL_KIND_CODE,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            URL_KIND_CODE => Some(SharedMediaType::Url),
            _ => None,
        }
    }
}

impl Serialize for SharedMediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for SharedMediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        SharedMediaType::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown media type code: {}", code)))
    }
}

/// One saved share: a URL plus an optional caption.
///
/// Wire shape is `{"path": ..., "message": ..., "type": 5}`. Records are
/// appended, never mutated, and removed only by a host-issued clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedItem {
    pub path: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: SharedMediaType,
}

impl SharedItem {
    /// Build a URL record. Fails if `path` is not a parseable URL; a record
    /// is never created without one.
    pub fn url(path: impl Into<String>, message: impl Into<String>) -> crate::app::Result<Self> {
        let path = path.into();
        url::Url::parse(&path)?;
        Ok(Self {
            path,
            message: message.into(),
            kind: SharedMediaType::Url,
        })
    }
}

/// In-memory result of aggregating a share payload. Never persisted; it is
/// the input to building a [`SharedItem`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    pub url: Option<String>,
    pub title: Option<String>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.title.is_none()
    }
}
