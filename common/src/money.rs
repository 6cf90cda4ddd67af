//! [`Money`]-related definitions.

use std::{fmt, iter, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Non-negative amount of money.
///
/// All amounts are denominated in the single accounting currency of the
/// building (Vietnamese đồng in the reference deployment), so no currency
/// axis is carried around.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// [`Money`] amount of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] amount if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the [`Decimal`] amount of this [`Money`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Adds the `other` amount to this one, saturating on overflow.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts the `other` amount from this one, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }

    /// Multiplies this amount by the given `factor`, saturating on overflow.
    ///
    /// Negative factors floor the result at zero, as no negative [`Money`]
    /// amount is representable.
    #[must_use]
    pub fn saturating_mul(self, factor: Decimal) -> Self {
        Self(self.0.saturating_mul(factor).max(Decimal::ZERO))
    }
}

impl iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "{}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("negative amount")
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    //! Module providing integration with [`postgres_types`] crate.

    use std::error::Error as StdError;

    use postgres_types::{
        private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
    };
    use rust_decimal::Decimal;

    use super::Money;

    impl FromSql<'_> for Money {
        fn accepts(ty: &Type) -> bool {
            <Decimal as FromSql<'_>>::accepts(ty)
        }

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            Money::new(Decimal::from_sql(ty, raw)?)
                .ok_or_else(|| "negative `Money` amount".into())
        }
    }

    impl ToSql for Money {
        to_sql_checked!();

        fn accepts(ty: &Type) -> bool {
            <Decimal as ToSql>::accepts(ty)
        }

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
            self.0.to_sql(ty, w)
        }
    }
}
