//! [`LineItem`] definitions.

use common::Money;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{fee, receipt};
#[cfg(doc)]
use crate::domain::{Fee, Receipt};

/// One computed charge of a [`Receipt`]: a single [`Fee`] billed at a
/// quantity and a unit-price snapshot.
///
/// Owned exclusively by its [`Receipt`]: created at assembly time and
/// replaced wholesale on receipt edits.
#[derive(Clone, Debug)]
pub struct LineItem {
    /// ID of this [`LineItem`].
    pub id: Id,

    /// ID of the [`Receipt`] owning this [`LineItem`].
    pub receipt_id: receipt::Id,

    /// ID of the billed [`Fee`].
    pub fee_id: fee::Id,

    /// Billed [`Quantity`] of the [`Fee`]'s unit.
    pub quantity: Quantity,

    /// Unit price of the [`Fee`], snapshotted at assembly time.
    ///
    /// Price changes after assembly never retroactively affect this
    /// [`LineItem`].
    pub unit_price: Money,

    /// Computed amount: always `quantity × unit_price`.
    pub amount: Money,
}

impl LineItem {
    /// Creates a new [`LineItem`] billing the given [`Fee`] unit price at the
    /// given [`Quantity`], computing its amount.
    #[must_use]
    pub fn compute(
        receipt_id: receipt::Id,
        fee_id: fee::Id,
        quantity: Quantity,
        unit_price: Money,
    ) -> Self {
        Self {
            id: Id::new(),
            receipt_id,
            fee_id,
            quantity,
            unit_price,
            amount: unit_price.saturating_mul(quantity.into()),
        }
    }

    /// Sums the amounts of the given [`LineItem`]s into a [`Receipt`] total.
    #[must_use]
    pub fn total(items: &[Self]) -> Money {
        items.iter().map(|i| i.amount).sum()
    }
}

/// ID of a [`LineItem`].
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

/// Quantity of a [`Fee`]'s unit billed by a [`LineItem`].
///
/// Always strictly positive; fractional quantities are legitimate (e.g. a
/// living area of 45.5 m²).
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Creates a new [`Quantity`] if the given `quantity` is strictly
    /// positive.
    #[must_use]
    pub fn new(quantity: Decimal) -> Option<Self> {
        (quantity > Decimal::ZERO).then_some(Self(quantity))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl FromStr for Quantity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quantity =
            s.parse::<Decimal>().map_err(|_| "invalid `Quantity`")?;
        Self::new(quantity).ok_or("non-positive `Quantity`")
    }
}
