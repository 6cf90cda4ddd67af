//! [`Household`] definitions.

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr, Into};
use itertools::Itertools as _;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{resident, vehicle, Resident, Vehicle};

/// Household occupying a room of the building.
#[derive(Clone, Debug)]
pub struct Household {
    /// ID of this [`Household`].
    pub id: Id,

    /// Number of the room this [`Household`] occupies.
    pub room: RoomNumber,

    /// ID of the [`Resident`] registered as the owner of this [`Household`].
    pub owner_id: resident::Id,

    /// Living area of the occupied room, in square meters.
    ///
    /// [`None`] means the area was never registered (legacy records).
    pub area: Option<Area>,

    /// [`Status`] of this [`Household`].
    pub status: Status,

    /// Free-form note about this [`Household`].
    pub note: Option<Note>,
}

impl Household {
    /// Indicates whether this [`Household`] currently occupies its room.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        matches!(self.status, Status::Occupied)
    }
}

/// ID of a [`Household`].
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

/// Number of the room a [`Household`] occupies.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct RoomNumber(u16);

/// Living area of a [`Household`]'s room, in square meters.
///
/// Always strictly positive.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Area(Decimal);

impl Area {
    /// Creates a new [`Area`] if the given `area` is strictly positive.
    #[must_use]
    pub fn new(area: Decimal) -> Option<Self> {
        (area > Decimal::ZERO).then_some(Self(area))
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let area = s.parse::<Decimal>().map_err(|_| "invalid `Area`")?;
        Self::new(area).ok_or("non-positive `Area`")
    }
}

/// Free-form note about a [`Household`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`] if the given `note` is valid.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        Self::check(&note).then_some(Self(note))
    }

    /// Checks whether the given `note` is a valid [`Note`].
    fn check(note: impl AsRef<str>) -> bool {
        let note = note.as_ref();
        note.trim() == note && !note.is_empty() && note.len() <= 512
    }
}

define_kind! {
    #[doc = "Status of a [`Household`]."]
    enum Status {
        #[doc = "The [`Household`] currently occupies its room."]
        Occupied = 1,

        #[doc = "The [`Household`] moved out and is kept for history only."]
        Historical = 2,
    }
}

/// Snapshot of a [`Household`]'s billable attributes.
///
/// Captures everything fee computation scales by: the living area, the
/// active-[`Resident`] headcount and the per-[`vehicle::Category`] counts.
#[derive(Clone, Copy, Debug)]
pub struct Profile {
    /// Living area of the [`Household`]'s room.
    pub area: Option<Area>,

    /// Number of active [`Resident`]s of the [`Household`].
    pub residents: u32,

    /// Number of [`vehicle::Category::Motorbike`] [`Vehicle`]s owned by the
    /// [`Household`].
    pub motorbikes: u32,

    /// Number of [`vehicle::Category::Car`] [`Vehicle`]s owned by the
    /// [`Household`].
    pub cars: u32,
}

impl Profile {
    /// Builds a [`Profile`] of the given [`Household`] out of its current
    /// [`Resident`]s and [`Vehicle`]s.
    ///
    /// Inactive [`Resident`]s don't count toward the headcount, and
    /// [`Vehicle`]s of the [`vehicle::Category::Other`] category count toward
    /// neither vehicle tally.
    #[must_use]
    pub fn new(
        household: &Household,
        residents: &[Resident],
        vehicles: &[Vehicle],
    ) -> Self {
        let categories = vehicles.iter().map(Vehicle::category).counts();
        let count_of = |category: vehicle::Category| {
            u32::try_from(categories.get(&category).copied().unwrap_or(0))
                .unwrap_or(u32::MAX)
        };
        Self {
            area: household.area,
            residents: u32::try_from(
                residents.iter().filter(|r| r.is_active).count(),
            )
            .unwrap_or(u32::MAX),
            motorbikes: count_of(vehicle::Category::Motorbike),
            cars: count_of(vehicle::Category::Car),
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Area, Household, Id, Profile, RoomNumber, Status};
    use crate::domain::{resident, vehicle, Resident, Vehicle};

    fn household(area: Option<Area>) -> Household {
        Household {
            id: Id::new(),
            room: RoomNumber::from(101),
            owner_id: resident::Id::new(),
            area,
            status: Status::Occupied,
            note: None,
        }
    }

    fn resident(household_id: Id, is_active: bool) -> Resident {
        Resident {
            id: resident::Id::new(),
            household_id,
            name: resident::Name::new("Nguyen Van A").unwrap(),
            is_active,
        }
    }

    fn vehicle(household_id: Id, label: &str) -> Vehicle {
        Vehicle {
            id: vehicle::Id::new(),
            household_id,
            plate: vehicle::PlateNumber::new("29A-123.45").unwrap(),
            label: vehicle::Label::new(label).unwrap(),
        }
    }

    #[test]
    fn counts_active_residents_only() {
        let h = household(None);
        let residents = vec![
            resident(h.id, true),
            resident(h.id, true),
            resident(h.id, false),
        ];

        let profile = Profile::new(&h, &residents, &[]);

        assert_eq!(profile.residents, 2);
    }

    #[test]
    fn tallies_vehicles_per_category() {
        let h = household("45.5".parse().ok());
        let vehicles = vec![
            vehicle(h.id, "Xe máy"),
            vehicle(h.id, "xe may"),
            vehicle(h.id, "Ô tô"),
            vehicle(h.id, "xe đạp"),
        ];

        let profile = Profile::new(&h, &[], &vehicles);

        assert_eq!(profile.motorbikes, 2);
        assert_eq!(profile.cars, 1);
    }
}
