//! [`Command`] for closing a collection [`Period`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{period, Period},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for closing a collection [`Period`].
///
/// A closed [`Period`] accepts no new receipts, neither from batch
/// generation nor from manual assembly. Payments against already issued
/// receipts stay possible.
#[derive(Clone, Copy, Debug)]
pub struct ClosePeriod {
    /// ID of the [`Period`] to close.
    pub period_id: period::Id,
}

impl<Db> Command<ClosePeriod> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Period, period::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Period>, period::Id>>,
            Ok = Option<Period>,
            Err = Traced<database::Error>,
        > + Database<Update<Period>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Period;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ClosePeriod) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ClosePeriod { period_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid a batch generation racing the closure.
        tx.execute(Lock(By::<Period, _>::new(period_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut period = tx
            .execute(Select(By::<Option<Period>, _>::new(period_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PeriodNotExists(period_id))
            .map_err(tracerr::wrap!())?;
        if !period.is_open() {
            return Err(tracerr::new!(E::PeriodAlreadyClosed(period.id)));
        }

        period.status = period::Status::Closed;
        tx.execute(Update(period.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(period)
    }
}

/// Error of [`ClosePeriod`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Period`] is already closed.
    #[display("`Period(id: {_0})` is already closed")]
    PeriodAlreadyClosed(#[error(not(source))] period::Id),

    /// [`Period`] with the provided ID does not exist.
    #[display("`Period(id: {_0})` does not exist")]
    PeriodNotExists(#[error(not(source))] period::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use super::{ClosePeriod, ExecutionError};
    use crate::{
        command::{
            assemble_receipt,
            fixtures::{fee, household, open_period, operator, service},
            AssembleReceipt,
        },
        domain::{fee::Method, period},
        Command as _,
    };

    #[tokio::test]
    async fn closes_open_period_blocking_new_receipts() {
        let svc = service();
        let period = open_period();
        let h = household(101, Some("45.5"));
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();

        let closed = svc
            .execute(ClosePeriod {
                period_id: period.id,
            })
            .await
            .unwrap();
        assert_eq!(closed.status, period::Status::Closed);

        let err = svc
            .execute(AssembleReceipt {
                household_id: h.id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            assemble_receipt::ExecutionError::PeriodClosed(_),
        ));
    }

    #[tokio::test]
    async fn reports_double_closure() {
        let svc = service();
        let period = open_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();

        let _ = svc
            .execute(ClosePeriod {
                period_id: period.id,
            })
            .await
            .unwrap();

        let err = svc
            .execute(ClosePeriod {
                period_id: period.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PeriodAlreadyClosed(_),
        ));
    }
}
