//! [`Command`] for deleting a [`Fee`] definition.

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, receipt::LineItem, Fee},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Fee`] definition.
///
/// A [`Fee`] referenced by any [`LineItem`] is part of issued receipts and
/// cannot be deleted anymore.
#[derive(Clone, Copy, Debug)]
pub struct DeleteFee {
    /// ID of the [`Fee`] to delete.
    pub fee_id: fee::Id,
}

impl<Db> Command<DeleteFee> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Fee, fee::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Fee>, fee::Id>>,
            Ok = Option<Fee>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<LineItem>, fee::Id>>,
            Ok = Vec<LineItem>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Fee, fee::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Fee;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteFee) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteFee { fee_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid a receipt assembly racing the usage check below.
        tx.execute(Lock(By::<Fee, _>::new(fee_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let fee = tx
            .execute(Select(By::<Option<Fee>, _>::new(fee_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FeeNotExists(fee_id))
            .map_err(tracerr::wrap!())?;

        let usages = tx
            .execute(Select(By::<Vec<LineItem>, _>::new(fee.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !usages.is_empty() {
            return Err(tracerr::new!(E::FeeInUse(fee.id)));
        }

        tx.execute(Delete(By::<Fee, _>::new(fee.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(fee)
    }
}

/// Error of [`DeleteFee`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Fee`] is referenced by line items of issued receipts.
    #[display("`Fee(id: {_0})` is referenced by issued receipts")]
    FeeInUse(#[error(not(source))] fee::Id),

    /// [`Fee`] with the provided ID does not exist.
    #[display("`Fee(id: {_0})` does not exist")]
    FeeNotExists(#[error(not(source))] fee::Id),
}
