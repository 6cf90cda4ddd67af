//! [`Command`] for recording a [`Payment`] against a [`Receipt`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        account, receipt,
        receipt::{payment, Payment},
        Receipt,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Payment`] against a [`Receipt`].
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Receipt`] the [`Payment`] is received against.
    pub receipt_id: receipt::Id,

    /// Received amount. Must be strictly positive.
    pub amount: Money,

    /// [`PaymentMethod`] the [`Payment`] is received by.
    ///
    /// [`PaymentMethod`]: receipt::PaymentMethod
    pub method: receipt::PaymentMethod,

    /// ID of the account recording the [`Payment`].
    pub recorder_id: account::Id,
}

impl<Db> Command<RecordPayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Receipt, receipt::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Receipt>, receipt::Id>>,
            Ok = Option<Receipt>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, receipt::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Update<Receipt>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = (Receipt, read::receipt::Balance);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            receipt_id,
            amount,
            method,
            recorder_id,
        } = cmd;

        // Negative amounts are unrepresentable by `Money`, so zero is the
        // only invalid value left.
        if amount.is_zero() {
            return Err(tracerr::new!(E::InvalidAmount));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize concurrent payments against the same receipt: the
        // read-sum-then-append below is a check-then-act.
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
        if !receipt.is_payable() {
            return Err(tracerr::new!(E::ReceiptLocked(receipt.id)));
        }

        let payments = tx
            .execute(Select(By::<Vec<Payment>, _>::new(receipt.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let paid = Payment::total(&payments).saturating_add(amount);
        if paid > receipt.total {
            return Err(tracerr::new!(E::Overpayment(receipt.id)));
        }

        tx.execute(Insert(Payment {
            id: payment::Id::new(),
            receipt_id: receipt.id,
            paid_at: DateTime::now().coerce(),
            amount,
            method,
            recorder_id,
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        receipt.status = receipt::Status::for_paid(receipt.total, paid);
        tx.execute(Update(receipt.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let balance = read::receipt::Balance {
            total: receipt.total,
            paid,
        };
        Ok((receipt, balance))
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Received amount is not strictly positive.
    #[display("payment amount must be strictly positive")]
    InvalidAmount,

    /// Cumulative payments would exceed the [`Receipt`]'s total.
    #[display("payment would overpay `Receipt(id: {_0})`")]
    Overpayment(#[error(not(source))] receipt::Id),

    /// [`Receipt`] accepts no further [`Payment`]s.
    #[display("`Receipt(id: {_0})` is locked for payments")]
    ReceiptLocked(#[error(not(source))] receipt::Id),

    /// [`Receipt`] with the provided ID does not exist.
    #[display("`Receipt(id: {_0})` does not exist")]
    ReceiptNotExists(#[error(not(source))] receipt::Id),
}
