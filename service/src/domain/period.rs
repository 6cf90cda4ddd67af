//! Collection [`Period`] definitions.

use common::{define_kind, Date};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Receipt;

/// Collection period: a time window during which [`Receipt`]s for a set of
/// fees are issued and collected (e.g. "March 2024").
#[derive(Clone, Debug)]
pub struct Period {
    /// ID of this [`Period`].
    pub id: Id,

    /// [`Name`] of this [`Period`].
    pub name: Name,

    /// [`Date`] this [`Period`] starts on.
    pub starts_on: Date,

    /// [`Date`] this [`Period`] ends on.
    pub ends_on: Date,

    /// [`Status`] of this [`Period`].
    pub status: Status,

    /// [`Description`] of this [`Period`].
    pub description: Option<Description>,
}

impl Period {
    /// Indicates whether this [`Period`] still accepts new [`Receipt`]s.
    ///
    /// Only the [`Status`] matters: calendar containment of the current date
    /// is deliberately not enforced, so a period may be kept open past its
    /// end date to collect stragglers.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.status, Status::Open)
    }
}

/// ID of a [`Period`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Period`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Description of a [`Period`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 512
    }
}

define_kind! {
    #[doc = "Status of a [`Period`]."]
    enum Status {
        #[doc = "The [`Period`] accepts new [`Receipt`]s."]
        Open = 1,

        #[doc = "The [`Period`] is closed for new [`Receipt`]s."]
        Closed = 2,
    }
}
