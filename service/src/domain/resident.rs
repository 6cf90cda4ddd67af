//! [`Resident`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::household;
#[cfg(doc)]
use crate::domain::Household;

/// Person registered as living in a [`Household`].
///
/// Only the active-occupancy flag matters to fee computation: inactive
/// [`Resident`]s (moved out, kept for history) don't count toward the
/// headcount.
#[derive(Clone, Debug)]
pub struct Resident {
    /// ID of this [`Resident`].
    pub id: Id,

    /// ID of the [`Household`] this [`Resident`] belongs to.
    pub household_id: household::Id,

    /// Full [`Name`] of this [`Resident`].
    pub name: Name,

    /// Indicator whether this [`Resident`] currently lives in the
    /// [`Household`].
    pub is_active: bool,
}

/// ID of a [`Resident`].
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

/// Full name of a [`Resident`].
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
