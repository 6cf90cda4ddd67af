//! [`Debt`] report definition.

use common::{
    operations::{By, Select},
    Money,
};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{
        household, period, receipt, receipt::Payment, Household, Receipt,
    },
    infra::{database, Database},
    read, Query, Service,
};
#[cfg(doc)]
use crate::domain::Period;

/// [`Query`] to compute the per-household debt report of a collection
/// [`Period`].
///
/// Voided receipts owe nothing and are excluded. Rendering the report into
/// a spreadsheet or a PDF is the embedding layer's concern.
#[derive(Clone, Copy, Debug)]
pub struct Debt {
    /// ID of the [`Period`] to report on.
    pub period_id: period::Id,
}

/// Output of the [`Debt`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Rows of the report, ordered by room number.
    pub rows: Vec<Row>,
}

impl Output {
    /// Sums the outstanding amounts over all rows.
    #[must_use]
    pub fn total_outstanding(&self) -> Money {
        self.rows.iter().map(|r| r.balance.outstanding()).sum()
    }
}

/// Row of the [`Debt`] report: one billed [`Household`].
#[derive(Clone, Copy, Debug)]
pub struct Row {
    /// ID of the billed [`Household`].
    pub household_id: household::Id,

    /// Room number of the [`Household`].
    pub room: household::RoomNumber,

    /// ID of the [`Receipt`] billing the [`Household`].
    pub receipt_id: receipt::Id,

    /// [`Status`] of the [`Receipt`].
    ///
    /// [`Status`]: receipt::Status
    pub status: receipt::Status,

    /// Payment [`Balance`] of the [`Receipt`].
    ///
    /// [`Balance`]: read::receipt::Balance
    pub balance: read::receipt::Balance,
}

impl<Db> Query<Debt> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Receipt>, period::Id>>,
            Ok = Vec<Receipt>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Household>, household::Id>>,
            Ok = Option<Household>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, receipt::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Debt { period_id }: Debt,
    ) -> Result<Self::Ok, Self::Err> {
        let receipts = self
            .database()
            .execute(Select(By::<Vec<Receipt>, _>::new(period_id)))
            .await
            .map_err(tracerr::wrap!())?;

        let mut rows = Vec::with_capacity(receipts.len());
        for receipt in receipts {
            if matches!(receipt.status, receipt::Status::Voided) {
                continue;
            }

            let Some(household) = self
                .database()
                .execute(Select(By::<Option<Household>, _>::new(
                    receipt.household_id,
                )))
                .await
                .map_err(tracerr::wrap!())?
            else {
                continue;
            };

            let payments = self
                .database()
                .execute(Select(By::<Vec<Payment>, _>::new(receipt.id)))
                .await
                .map_err(tracerr::wrap!())?;

            rows.push(Row {
                household_id: household.id,
                room: household.room,
                receipt_id: receipt.id,
                status: receipt.status,
                balance: read::receipt::Balance {
                    total: receipt.total,
                    paid: Payment::total(&payments),
                },
            });
        }

        let rows = rows.into_iter().sorted_by_key(|r| r.room).collect();
        Ok(Output { rows })
    }
}
