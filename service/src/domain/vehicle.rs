//! [`Vehicle`] definitions.

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr, Into};
use itertools::Itertools as _;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::household;
#[cfg(doc)]
use crate::domain::Household;

/// Vehicle parked in the building by a [`Household`].
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// ID of the [`Household`] owning this [`Vehicle`].
    pub household_id: household::Id,

    /// License plate of this [`Vehicle`].
    pub plate: PlateNumber,

    /// Free-text [`Label`] describing the kind of this [`Vehicle`], as it was
    /// entered into the registry.
    pub label: Label,
}

impl Vehicle {
    /// Returns [`Category`] of this [`Vehicle`], derived from its [`Label`].
    #[must_use]
    pub fn category(&self) -> Category {
        Category::from_label(self.label.as_ref())
    }
}

/// ID of a [`Vehicle`].
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

/// License plate of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Creates a new [`PlateNumber`] if the given `plate` is valid.
    #[must_use]
    pub fn new(plate: impl Into<String>) -> Option<Self> {
        let plate = plate.into();
        Self::check(&plate).then_some(Self(plate))
    }

    /// Checks whether the given `plate` is a valid [`PlateNumber`].
    fn check(plate: impl AsRef<str>) -> bool {
        let plate = plate.as_ref();
        plate.trim() == plate && !plate.is_empty() && plate.len() <= 32
    }
}

impl FromStr for PlateNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PlateNumber`")
    }
}

/// Free-text label describing the kind of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Label(String);

impl Label {
    /// Creates a new [`Label`] if the given `label` is valid.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        Self::check(&label).then_some(Self(label))
    }

    /// Checks whether the given `label` is a valid [`Label`].
    fn check(label: impl AsRef<str>) -> bool {
        let label = label.as_ref();
        label.trim() == label && !label.is_empty() && label.len() <= 128
    }
}

impl FromStr for Label {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Label`")
    }
}

define_kind! {
    #[doc = "Category of a [`Vehicle`], derived from its free-text [`Label`]."]
    enum Category {
        #[doc = "Motorbike or scooter."]
        Motorbike = 1,

        #[doc = "Car."]
        Car = 2,

        #[doc = "Anything not recognized as a motorbike or a car."]
        Other = 3,
    }
}

/// Known ways the registry spells a motorbike.
const MOTORBIKE_LABELS: &[&str] =
    &["xe máy", "xe may", "xemay", "moto", "motorbike", "motorcycle"];

/// Known ways the registry spells a car.
const CAR_LABELS: &[&str] = &["ô tô", "o to", "oto", "car", "automobile"];

impl Category {
    /// Derives a [`Category`] from the given free-text `label`.
    ///
    /// Matching is case-insensitive and whitespace-normalized, tolerating the
    /// inconsistent spellings of historical data entry. Labels matching
    /// neither known synonym set fall into [`Category::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalized = label.to_lowercase().split_whitespace().join(" ");
        if MOTORBIKE_LABELS.iter().any(|l| normalized.contains(l)) {
            Self::Motorbike
        } else if CAR_LABELS.iter().any(|l| normalized.contains(l)) {
            Self::Car
        } else {
            Self::Other
        }
    }
}
