//! Typed identifiers for the two kinds of on-screen objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque image identifier as handed out by the image-list source.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row-major grid index of a group. Also its position in registration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl GroupId {
    /// Wire value for "no group": images still in staging.
    pub const STAGING_SENTINEL: i32 = -1;

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Integer used in move records, with staging mapped to the sentinel.
    #[must_use]
    pub fn wire_index(group: Option<Self>) -> i32 {
        group.map_or(Self::STAGING_SENTINEL, |g| g.0 as i32)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// Reference to either kind of object, used by render updates and lookups.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ObjectRef {
    Group(GroupId),
    Image(ImageId),
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(g) => write!(f, "{g}"),
            Self::Image(i) => write!(f, "image {i}"),
        }
    }
}
