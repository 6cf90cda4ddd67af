//! [`Command`] for voiding a [`Receipt`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{account, receipt, Receipt},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for voiding a [`Receipt`].
///
/// Voiding is the administrative way to cancel a mistaken bill: it blocks
/// all further payments and frees the `(household, period)` slot for a
/// replacement [`Receipt`]. A fully paid receipt can never be voided.
#[derive(Clone, Copy, Debug)]
pub struct VoidReceipt {
    /// ID of the [`Receipt`] to void.
    pub receipt_id: receipt::Id,

    /// ID of the account voiding the [`Receipt`].
    pub initiator_id: account::Id,
}

impl<Db> Command<VoidReceipt> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Receipt, receipt::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Receipt>, receipt::Id>>,
            Ok = Option<Receipt>,
            Err = Traced<database::Error>,
        > + Database<Update<Receipt>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Receipt;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VoidReceipt) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VoidReceipt {
            receipt_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing payments against the voided receipt.
        tx.execute(Lock(By::<Receipt, _>::new(receipt_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut receipt = tx
            .execute(Select(By::<Option<Receipt>, _>::new(receipt_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReceiptNotExists(receipt_id))
            .map_err(tracerr::wrap!())?;
        if matches!(receipt.status, receipt::Status::Voided) {
            return Err(tracerr::new!(E::AlreadyVoided(receipt.id)));
        }
        if !receipt.can_void() {
            return Err(tracerr::new!(E::ReceiptLocked(receipt.id)));
        }

        receipt.status = receipt::Status::Voided;
        tx.execute(Update(receipt.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            receipt_id = %receipt.id,
            initiator_id = %initiator_id,
            "receipt voided",
        );

        Ok(receipt)
    }
}

/// Error of [`VoidReceipt`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Receipt`] is already voided.
    #[display("`Receipt(id: {_0})` is already voided")]
    AlreadyVoided(#[error(not(source))] receipt::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Receipt`] is fully paid and can never be voided.
    #[display("`Receipt(id: {_0})` is locked for voiding")]
    ReceiptLocked(#[error(not(source))] receipt::Id),

    /// [`Receipt`] with the provided ID does not exist.
    #[display("`Receipt(id: {_0})` does not exist")]
    ReceiptNotExists(#[error(not(source))] receipt::Id),
}
