//! [`Command`] for deleting a [`Receipt`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{receipt, receipt::LineItem, Receipt},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Receipt`] together with its [`LineItem`]s.
///
/// Only an unpaid [`Receipt`] may be deleted; once any payment is recorded,
/// the receipt is a financial record and stays.
#[derive(Clone, Copy, Debug)]
pub struct DeleteReceipt {
    /// ID of the [`Receipt`] to delete.
    pub receipt_id: receipt::Id,
}

impl<Db> Command<DeleteReceipt> for Service<Db>
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
            Delete<By<Vec<LineItem>, receipt::Id>>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Receipt, receipt::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Receipt;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteReceipt,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReceipt { receipt_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent deletions and racing payments.
        tx.execute(Lock(By::<Receipt, _>::new(receipt_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let receipt = tx
            .execute(Select(By::<Option<Receipt>, _>::new(receipt_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReceiptNotExists(receipt_id))
            .map_err(tracerr::wrap!())?;
        if !receipt.is_modifiable() {
            return Err(tracerr::new!(E::ReceiptLocked(receipt.id)));
        }

        tx.execute(Delete(By::<Vec<LineItem>, _>::new(receipt.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<Receipt, _>::new(receipt.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(receipt)
    }
}

/// Error of [`DeleteReceipt`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Receipt`] is no longer deletable.
    #[display("`Receipt(id: {_0})` is locked for deletion")]
    ReceiptLocked(#[error(not(source))] receipt::Id),

    /// [`Receipt`] with the provided ID does not exist.
    #[display("`Receipt(id: {_0})` does not exist")]
    ReceiptNotExists(#[error(not(source))] receipt::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::{DeleteReceipt, ExecutionError};
    use crate::{
        command::fixtures::{
            assembled_receipt, fee, money, operator, service,
        },
        domain::{fee::Method, receipt, receipt::LineItem, Receipt},
        Command as _,
    };

    #[tokio::test]
    async fn deletes_unpaid_receipt_with_line_items() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;

        let deleted = svc
            .execute(DeleteReceipt {
                receipt_id: receipt.id,
            })
            .await
            .unwrap();
        assert_eq!(deleted.id, receipt.id);

        let stored: Option<Receipt> = svc
            .database()
            .execute(Select(By::<Option<Receipt>, _>::new(receipt.id)))
            .await
            .unwrap();
        assert!(stored.is_none());

        let items: Vec<LineItem> = svc
            .database()
            .execute(Select(By::<Vec<LineItem>, _>::new(receipt.id)))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn rejects_partially_paid_receipt() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;
        let _ = svc
            .execute(crate::command::RecordPayment {
                receipt_id: receipt.id,
                amount: money("100000"),
                method: receipt::PaymentMethod::new("tiền mặt").unwrap(),
                recorder_id: operator(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(DeleteReceipt {
                receipt_id: receipt.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ReceiptLocked(_)));
    }

    #[tokio::test]
    async fn rejects_missing_receipt() {
        let svc = service();
        // Unrelated data only.
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();

        let err = svc
            .execute(DeleteReceipt {
                receipt_id: receipt::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ReceiptNotExists(_)));
    }
}
