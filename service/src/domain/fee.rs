//! [`Fee`] definitions.

use common::{define_kind, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use itertools::Itertools as _;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::household;
#[cfg(doc)]
use crate::domain::Household;

/// Definition of a charge collected from [`Household`]s.
#[derive(Clone, Debug)]
pub struct Fee {
    /// ID of this [`Fee`].
    pub id: Id,

    /// [`Name`] of this [`Fee`].
    pub name: Name,

    /// Price of this [`Fee`] per charged unit.
    pub unit_price: Money,

    /// Label of the charged unit (e.g. "m²", "người", "xe").
    pub unit: Option<UnitLabel>,

    /// [`Method`] the amount of this [`Fee`] is computed by.
    pub method: Method,

    /// Indicator whether this [`Fee`] is charged to every eligible
    /// [`Household`] automatically.
    pub mandatory: bool,

    /// [`Description`] of this [`Fee`].
    pub description: Option<Description>,
}

impl Fee {
    /// Resolves the multiplier this [`Fee`]'s unit price is scaled by for the
    /// given [`household::Profile`].
    ///
    /// Returns zero whenever the [`household::Profile`] lacks the data the
    /// [`Method`] scales by (no registered area, no residents, no vehicles of
    /// the category), meaning the [`Fee`] doesn't apply to the
    /// [`Household`].
    ///
    /// An [`Method::Unrecognized`] method is charged as a fixed per-household
    /// fee, preserving the tolerance for legacy free-text method labels, and
    /// is reported through a [`tracing::warn!`] event so data-quality gaps
    /// stay visible.
    #[must_use]
    pub fn multiplier(&self, profile: &household::Profile) -> Decimal {
        match self.method {
            Method::PerHousehold => Decimal::ONE,
            Method::PerResident => profile.residents.into(),
            Method::PerArea => {
                profile.area.map_or(Decimal::ZERO, Into::into)
            }
            Method::PerMotorbike => profile.motorbikes.into(),
            Method::PerCar => profile.cars.into(),
            Method::Unrecognized => {
                tracing::warn!(
                    fee_id = %self.id,
                    fee_name = %self.name,
                    "unrecognized calculation method, charging as fixed \
                     per-household fee",
                );
                Decimal::ONE
            }
        }
    }

    /// Computes the amount of this [`Fee`] owed by a [`Household`] with the
    /// given [`household::Profile`].
    ///
    /// Pure function of its inputs: insufficient source data yields a zero
    /// amount rather than an error.
    #[must_use]
    pub fn compute(&self, profile: &household::Profile) -> Money {
        self.unit_price.saturating_mul(self.multiplier(profile))
    }
}

/// ID of a [`Fee`].
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

/// Name of a [`Fee`].
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

/// Label of the unit a [`Fee`] is charged per.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct UnitLabel(String);

impl UnitLabel {
    /// Creates a new [`UnitLabel`] if the given `label` is valid.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        Self::check(&label).then_some(Self(label))
    }

    /// Checks whether the given `label` is a valid [`UnitLabel`].
    fn check(label: impl AsRef<str>) -> bool {
        let label = label.as_ref();
        label.trim() == label && !label.is_empty() && label.len() <= 64
    }
}

/// Description of a [`Fee`].
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

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

define_kind! {
    #[doc = "Method the amount of a [`Fee`] is computed by."]
    enum Method {
        #[doc = "Fixed amount per [`Household`]."]
        PerHousehold = 1,

        #[doc = "Unit price multiplied by the active-resident headcount."]
        PerResident = 2,

        #[doc = "Unit price multiplied by the living area in square meters."]
        PerArea = 3,

        #[doc = "Unit price multiplied by the motorbike count."]
        PerMotorbike = 4,

        #[doc = "Unit price multiplied by the car count."]
        PerCar = 5,

        #[doc = "Legacy method label matching no known method."]
        Unrecognized = 6,
    }
}

/// Known legacy spellings of [`Method::PerHousehold`].
const PER_HOUSEHOLD_LABELS: &[&str] =
    &["hộ khẩu", "ho khau", "hokhau", "cố định", "co dinh", "codinh", "fixed"];

/// Known legacy spellings of [`Method::PerResident`].
const PER_RESIDENT_LABELS: &[&str] = &[
    "nhân khẩu",
    "nhan khau",
    "nhankhau",
    "person",
    "perperson",
    "per person",
];

/// Known legacy spellings of [`Method::PerArea`].
const PER_AREA_LABELS: &[&str] =
    &["diện tích", "dien tich", "dientich", "area", "perarea", "per area"];

/// Known legacy spellings of [`Method::PerMotorbike`].
const PER_MOTORBIKE_LABELS: &[&str] =
    &["xe máy", "xe may", "xemay", "moto", "motorbike"];

/// Known legacy spellings of [`Method::PerCar`].
const PER_CAR_LABELS: &[&str] = &["ô tô", "o to", "oto", "car", "automobile"];

impl Method {
    /// Normalizes a free-text method `label` into a [`Method`].
    ///
    /// Matching is case-insensitive and whitespace-normalized, covering the
    /// spellings met in legacy fee registries. An empty label means the
    /// method was never specified and maps to the documented default of
    /// [`Method::PerHousehold`]; any other unknown label maps to
    /// [`Method::Unrecognized`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalized = label.to_lowercase().split_whitespace().join(" ");
        if normalized.is_empty() {
            return Self::PerHousehold;
        }

        [
            (PER_HOUSEHOLD_LABELS, Self::PerHousehold),
            (PER_RESIDENT_LABELS, Self::PerResident),
            (PER_AREA_LABELS, Self::PerArea),
            (PER_MOTORBIKE_LABELS, Self::PerMotorbike),
            (PER_CAR_LABELS, Self::PerCar),
        ]
        .into_iter()
        .find_map(|(labels, method)| {
            labels.contains(&normalized.as_str()).then_some(method)
        })
        .unwrap_or(Self::Unrecognized)
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use super::{Fee, Id, Method, Name};
    use crate::domain::household;

    fn fee(method: Method, unit_price: &str) -> Fee {
        Fee {
            id: Id::new(),
            name: Name::new("Phí quản lý").unwrap(),
            unit_price: unit_price.parse().unwrap(),
            unit: None,
            method,
            mandatory: true,
            description: None,
        }
    }

    fn profile(
        area: Option<&str>,
        residents: u32,
        motorbikes: u32,
        cars: u32,
    ) -> household::Profile {
        household::Profile {
            area: area.map(|a| a.parse().unwrap()),
            residents,
            motorbikes,
            cars,
        }
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn from_label() {
        assert_eq!(Method::from_label("Hộ khẩu"), Method::PerHousehold);
        assert_eq!(Method::from_label("CODINH"), Method::PerHousehold);
        assert_eq!(Method::from_label("fixed"), Method::PerHousehold);
        assert_eq!(Method::from_label("Nhân   khẩu"), Method::PerResident);
        assert_eq!(Method::from_label("perperson"), Method::PerResident);
        assert_eq!(Method::from_label("Diện tích"), Method::PerArea);
        assert_eq!(Method::from_label("area"), Method::PerArea);
        assert_eq!(Method::from_label("xe máy"), Method::PerMotorbike);
        assert_eq!(Method::from_label("OTO"), Method::PerCar);

        assert_eq!(Method::from_label(""), Method::PerHousehold);
        assert_eq!(Method::from_label("   "), Method::PerHousehold);

        assert_eq!(Method::from_label("theo mét khối"), Method::Unrecognized);
        assert_eq!(Method::from_label("per pet"), Method::Unrecognized);
    }

    #[test]
    fn per_household_ignores_profile() {
        let fee = fee(Method::PerHousehold, "70000");

        assert_eq!(fee.compute(&profile(None, 0, 0, 0)), money("70000"));
        assert_eq!(fee.compute(&profile(Some("99"), 7, 2, 1)), money("70000"));
    }

    #[test]
    fn per_resident_scales_by_headcount() {
        let fee = fee(Method::PerResident, "15000");

        assert_eq!(fee.compute(&profile(None, 4, 0, 0)), money("60000"));
        assert_eq!(fee.compute(&profile(None, 0, 0, 0)), Money::ZERO);
    }

    #[test]
    fn per_area_scales_by_area() {
        let fee = fee(Method::PerArea, "5000");

        assert_eq!(
            fee.compute(&profile(Some("45.5"), 0, 0, 0)),
            money("227500"),
        );
        assert_eq!(fee.compute(&profile(None, 3, 0, 0)), Money::ZERO);
    }

    #[test]
    fn per_vehicle_scales_by_category_count() {
        let motorbike = fee(Method::PerMotorbike, "100000");
        assert_eq!(
            motorbike.compute(&profile(None, 0, 3, 1)),
            money("300000"),
        );
        assert_eq!(motorbike.compute(&profile(None, 0, 0, 5)), Money::ZERO);

        let car = fee(Method::PerCar, "1200000");
        assert_eq!(car.compute(&profile(None, 0, 3, 1)), money("1200000"));
        assert_eq!(car.compute(&profile(None, 0, 3, 0)), Money::ZERO);
    }

    #[test]
    fn unrecognized_charges_as_fixed() {
        let fee = fee(Method::Unrecognized, "50000");

        assert_eq!(fee.compute(&profile(None, 0, 0, 0)), money("50000"));
        assert_eq!(fee.multiplier(&profile(Some("10"), 2, 1, 1)), Decimal::ONE);
    }
}
