//! [`Receipt`] definitions.

pub mod line_item;
pub mod payment;

use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{account, household, period};
#[cfg(doc)]
use crate::domain::{Household, Period};

pub use self::{line_item::LineItem, payment::Payment};

/// Bill issued to a [`Household`] for a collection [`Period`], aggregating
/// [`LineItem`]s into a total amount owed.
#[derive(Clone, Debug)]
pub struct Receipt {
    /// ID of this [`Receipt`].
    pub id: Id,

    /// ID of the [`Household`] this [`Receipt`] is billed to.
    pub household_id: household::Id,

    /// ID of the [`Period`] this [`Receipt`] belongs to.
    pub period_id: period::Id,

    /// ID of the account that prepared this [`Receipt`].
    pub preparer_id: account::Id,

    /// [`DateTime`] when this [`Receipt`] was prepared.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// Total amount owed: the sum of this [`Receipt`]'s [`LineItem`] amounts.
    ///
    /// Always recomputed from the line items, never taken from input.
    pub total: Money,

    /// [`Status`] of this [`Receipt`].
    pub status: Status,

    /// Label of the method the [`Receipt`] is paid by, if known.
    pub method: Option<PaymentMethod>,
}

impl Receipt {
    /// Indicates whether this [`Receipt`]'s line items may still be edited
    /// and the [`Receipt`] itself deleted.
    ///
    /// Only an [`Status::Unpaid`] receipt is modifiable: a partial payment
    /// already represents a financial commitment that a silent total change
    /// would invalidate.
    #[must_use]
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, Status::Unpaid)
    }

    /// Indicates whether further [`Payment`]s may be recorded against this
    /// [`Receipt`].
    #[must_use]
    pub fn is_payable(&self) -> bool {
        matches!(self.status, Status::Unpaid | Status::PartiallyPaid)
    }

    /// Indicates whether this [`Receipt`] may be voided.
    ///
    /// A fully paid receipt is a settled financial record and can never be
    /// voided.
    #[must_use]
    pub fn can_void(&self) -> bool {
        matches!(self.status, Status::Unpaid | Status::PartiallyPaid)
    }
}

/// ID of a [`Receipt`].
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

/// Label of the method a [`Receipt`] is paid by (e.g. "tiền mặt", "chuyển
/// khoản").
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Creates a new [`PaymentMethod`] if the given `method` is valid.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Option<Self> {
        let method = method.into();
        Self::check(&method).then_some(Self(method))
    }

    /// Checks whether the given `method` is a valid [`PaymentMethod`].
    fn check(method: impl AsRef<str>) -> bool {
        let method = method.as_ref();
        method.trim() == method && !method.is_empty() && method.len() <= 64
    }
}

impl FromStr for PaymentMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PaymentMethod`")
    }
}

define_kind! {
    #[doc = "Status of a [`Receipt`] over its payment lifecycle."]
    enum Status {
        #[doc = "No payment recorded yet."]
        Unpaid = 1,

        #[doc = "Partially paid: payments recorded, but below the total."]
        PartiallyPaid = 2,

        #[doc = "Fully paid. Terminal for payment purposes."]
        Paid = 3,

        #[doc = "Voided by an administrator. Terminal."]
        Voided = 4,
    }
}

impl Status {
    /// Resolves the [`Status`] a [`Receipt`] with the given `total` transits
    /// to once its cumulative recorded payments reach `paid`.
    ///
    /// Overpayments are rejected before any payment is recorded, so `paid`
    /// can never exceed `total`; equality is the only path to
    /// [`Status::Paid`].
    #[must_use]
    pub fn for_paid(total: Money, paid: Money) -> Self {
        if paid.is_zero() {
            Self::Unpaid
        } else if paid < total {
            Self::PartiallyPaid
        } else {
            Self::Paid
        }
    }
}

/// [`DateTime`] when a [`Receipt`] was prepared.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Receipt, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::Status;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn status_follows_cumulative_payments() {
        let total = money("300000");

        assert_eq!(Status::for_paid(total, Money::ZERO), Status::Unpaid);
        assert_eq!(
            Status::for_paid(total, money("100000")),
            Status::PartiallyPaid,
        );
        assert_eq!(
            Status::for_paid(total, money("299999.99")),
            Status::PartiallyPaid,
        );
        assert_eq!(Status::for_paid(total, money("300000")), Status::Paid);
    }
}
