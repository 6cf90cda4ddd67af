//! [`Payment`] definitions.

use common::{unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{account, receipt};
#[cfg(doc)]
use crate::domain::Receipt;

use super::PaymentMethod;

/// Record of money received against a [`Receipt`].
///
/// Append-only: payments are never edited or removed, and their sum never
/// exceeds the owning [`Receipt`]'s total.
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Receipt`] this [`Payment`] was received against.
    pub receipt_id: receipt::Id,

    /// [`DateTime`] when this [`Payment`] was received.
    ///
    /// [`DateTime`]: common::DateTime
    pub paid_at: CreationDateTime,

    /// Amount of money received. Always strictly positive.
    pub amount: Money,

    /// [`PaymentMethod`] this [`Payment`] was received by.
    pub method: PaymentMethod,

    /// ID of the account that recorded this [`Payment`].
    pub recorder_id: account::Id,
}

impl Payment {
    /// Sums the amounts of the given [`Payment`]s.
    #[must_use]
    pub fn total(payments: &[Self]) -> Money {
        payments.iter().map(|p| p.amount).sum()
    }
}

/// ID of a [`Payment`].
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

/// [`DateTime`] when a [`Payment`] was received.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;
