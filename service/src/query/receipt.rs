//! [`Query`] collection related to [`Receipt`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{
        household, period, receipt,
        receipt::{LineItem, Payment},
        Receipt,
    },
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Household, Period};

use super::{DatabaseQuery, Query};

/// Queries a [`Receipt`] by its [`receipt::Id`].
pub type ById = DatabaseQuery<By<Option<Receipt>, receipt::Id>>;

/// Queries all [`Receipt`]s of a [`Household`], oldest first.
pub type ForHousehold = DatabaseQuery<By<Vec<Receipt>, household::Id>>;

/// Queries all [`Receipt`]s of a collection [`Period`], oldest first.
pub type ForPeriod = DatabaseQuery<By<Vec<Receipt>, period::Id>>;

/// Queries the [`LineItem`]s of a [`Receipt`].
pub type LineItems = DatabaseQuery<By<Vec<LineItem>, receipt::Id>>;

/// [`Query`] resolving the payment [`Balance`] of a [`Receipt`].
///
/// [`Balance`]: read::receipt::Balance
#[derive(Clone, Copy, Debug)]
pub struct BalanceOf {
    /// ID of the [`Receipt`] to resolve the balance of.
    pub receipt_id: receipt::Id,
}

impl<Db> Query<BalanceOf> for Service<Db>
where
    Db: Database<
            Select<By<Option<Receipt>, receipt::Id>>,
            Ok = Option<Receipt>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, receipt::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::receipt::Balance>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        BalanceOf { receipt_id }: BalanceOf,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(receipt) = self
            .database()
            .execute(Select(By::<Option<Receipt>, _>::new(receipt_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let payments = self
            .database()
            .execute(Select(By::<Vec<Payment>, _>::new(receipt.id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::receipt::Balance {
            total: receipt.total,
            paid: Payment::total(&payments),
        }))
    }
}

/// [`Query`] resolving whether a [`Receipt`] may still be edited or deleted.
///
/// A missing [`Receipt`] resolves to `false`: there is nothing to modify.
#[derive(Clone, Copy, Debug)]
pub struct CanModify {
    /// ID of the [`Receipt`] to check.
    pub receipt_id: receipt::Id,
}

impl<Db> Query<CanModify> for Service<Db>
where
    Db: Database<
        Select<By<Option<Receipt>, receipt::Id>>,
        Ok = Option<Receipt>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        CanModify { receipt_id }: CanModify,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .database()
            .execute(Select(By::<Option<Receipt>, _>::new(receipt_id)))
            .await
            .map_err(tracerr::wrap!())?
            .is_some_and(|r| r.is_modifiable()))
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use super::{BalanceOf, CanModify};
    use crate::{
        command::{
            fixtures::{assembled_receipt, money, operator, service},
            RecordPayment,
        },
        domain::receipt,
        Command as _,
    };

    #[tokio::test]
    async fn balance_is_derived_from_the_ledger() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;

        let balance = svc
            .execute(BalanceOf {
                receipt_id: receipt.id,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.total, money("300000"));
        assert_eq!(balance.paid, Money::ZERO);
        assert_eq!(balance.outstanding(), money("300000"));

        let _ = svc
            .execute(RecordPayment {
                receipt_id: receipt.id,
                amount: money("120000"),
                method: receipt::PaymentMethod::new("tiền mặt").unwrap(),
                recorder_id: operator(),
            })
            .await
            .unwrap();

        let balance = svc
            .execute(BalanceOf {
                receipt_id: receipt.id,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.paid, money("120000"));
        assert_eq!(balance.outstanding(), money("180000"));
    }

    #[tokio::test]
    async fn selects_receipts_through_aliases() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;

        let found = svc
            .execute(super::ById::by(receipt.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, receipt.id);

        let of_household = svc
            .execute(super::ForHousehold::by(receipt.household_id))
            .await
            .unwrap();
        assert_eq!(of_household.len(), 1);

        let of_period = svc
            .execute(super::ForPeriod::by(receipt.period_id))
            .await
            .unwrap();
        assert_eq!(of_period.len(), 1);

        let items = svc
            .execute(super::LineItems::by(receipt.id))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, receipt.total);
    }

    #[tokio::test]
    async fn missing_receipt_has_no_balance() {
        let svc = service();

        let balance = svc
            .execute(BalanceOf {
                receipt_id: receipt::Id::new(),
            })
            .await
            .unwrap();

        assert!(balance.is_none());
    }

    #[tokio::test]
    async fn modifiability_follows_the_lifecycle() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;

        assert!(svc
            .execute(CanModify {
                receipt_id: receipt.id,
            })
            .await
            .unwrap());

        let _ = svc
            .execute(RecordPayment {
                receipt_id: receipt.id,
                amount: money("1000"),
                method: receipt::PaymentMethod::new("tiền mặt").unwrap(),
                recorder_id: operator(),
            })
            .await
            .unwrap();

        assert!(!svc
            .execute(CanModify {
                receipt_id: receipt.id,
            })
            .await
            .unwrap());

        assert!(!svc
            .execute(CanModify {
                receipt_id: receipt::Id::new(),
            })
            .await
            .unwrap());
    }
}
