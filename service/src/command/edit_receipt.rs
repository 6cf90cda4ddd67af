//! [`Command`] for editing the line items of a [`Receipt`].

use common::operations::{
    By, Commit, Lock, Replace, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, receipt, receipt::LineItem, Fee, Receipt},
    infra::{database, Database},
    Service,
};

use super::{assemble_receipt::LineItemRequest, Command};

/// [`Command`] for replacing the [`LineItem`]s of a [`Receipt`] wholesale.
///
/// Unit prices are snapshotted anew from the referenced [`Fee`]s, and the
/// [`Receipt`] total is recomputed from the replacement lines, so it can
/// never drift from them.
#[derive(Clone, Debug)]
pub struct EditReceipt {
    /// ID of the [`Receipt`] to edit.
    pub receipt_id: receipt::Id,

    /// Replacement line items.
    pub line_items: Vec<LineItemRequest>,
}

impl<Db> Command<EditReceipt> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Fee>, fee::Id>>,
            Ok = Option<Fee>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Receipt, receipt::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Receipt>, receipt::Id>>,
            Ok = Option<Receipt>,
            Err = Traced<database::Error>,
        > + Database<Replace<Vec<LineItem>>, Err = Traced<database::Error>>
        + Database<Update<Receipt>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = (Receipt, Vec<LineItem>);
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: EditReceipt) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EditReceipt {
            receipt_id,
            line_items,
        } = cmd;

        if line_items.is_empty() {
            return Err(tracerr::new!(E::NoLineItems));
        }

        let mut items = Vec::with_capacity(line_items.len());
        for request in line_items {
            let fee = self
                .database()
                .execute(Select(By::<Option<Fee>, _>::new(request.fee_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::FeeNotExists(request.fee_id))
                .map_err(tracerr::wrap!())?;
            items.push(LineItem::compute(
                receipt_id,
                fee.id,
                request.quantity,
                fee.unit_price,
            ));
        }
        let total = LineItem::total(&items);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing payments against the edited receipt.
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
        if !receipt.is_modifiable() {
            return Err(tracerr::new!(E::ReceiptLocked(receipt.id)));
        }

        receipt.total = total;
        tx.execute(Update(receipt.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Replace(items.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok((receipt, items))
    }
}

/// Error of [`EditReceipt`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Fee`] with the provided ID does not exist.
    #[display("`Fee(id: {_0})` does not exist")]
    FeeNotExists(#[error(not(source))] fee::Id),

    /// Replacement line-item list is empty.
    #[display("empty list of line items provided")]
    NoLineItems,

    /// [`Receipt`] is no longer modifiable.
    #[display("`Receipt(id: {_0})` is locked for edits")]
    ReceiptLocked(#[error(not(source))] receipt::Id),

    /// [`Receipt`] with the provided ID does not exist.
    #[display("`Receipt(id: {_0})` does not exist")]
    ReceiptNotExists(#[error(not(source))] receipt::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::{EditReceipt, ExecutionError};
    use crate::{
        command::{
            assemble_receipt::LineItemRequest,
            fixtures::{assembled_receipt, fee, money, operator, service},
            RecordPayment,
        },
        domain::{fee::Method, receipt, receipt::LineItem},
        Command as _,
    };

    #[tokio::test]
    async fn replaces_line_items_and_recomputes_total() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;
        let extra = fee("Phí vệ sinh", Method::PerResident, "6000", false);
        svc.database().execute(Insert(extra.clone())).await.unwrap();

        let (edited, items) = svc
            .execute(EditReceipt {
                receipt_id: receipt.id,
                line_items: vec![LineItemRequest {
                    fee_id: extra.id,
                    quantity: "4".parse().unwrap(),
                }],
            })
            .await
            .unwrap();

        assert_eq!(edited.total, money("24000"));
        assert_eq!(items.len(), 1);

        // The old line items are gone from the store as well.
        let stored: Vec<LineItem> = svc
            .database()
            .execute(Select(By::<Vec<LineItem>, _>::new(receipt.id)))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fee_id, extra.id);
        assert_eq!(LineItem::total(&stored), edited.total);
    }

    #[tokio::test]
    async fn snapshots_prices_at_edit_time() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;
        let mut extra = fee("Phí vệ sinh", Method::PerResident, "6000", false);
        svc.database().execute(Insert(extra.clone())).await.unwrap();

        // The administrator raises the price afterwards.
        extra.unit_price = money("9000");
        svc.database().execute(Insert(extra.clone())).await.unwrap();

        let (edited, items) = svc
            .execute(EditReceipt {
                receipt_id: receipt.id,
                line_items: vec![LineItemRequest {
                    fee_id: extra.id,
                    quantity: "2".parse().unwrap(),
                }],
            })
            .await
            .unwrap();

        assert_eq!(items[0].unit_price, money("9000"));
        assert_eq!(edited.total, money("18000"));
    }

    #[tokio::test]
    async fn rejects_partially_paid_receipt() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;
        let _ = svc
            .execute(RecordPayment {
                receipt_id: receipt.id,
                amount: money("100000"),
                method: receipt::PaymentMethod::new("tiền mặt").unwrap(),
                recorder_id: operator(),
            })
            .await
            .unwrap();
        let extra = fee("Phí vệ sinh", Method::PerResident, "6000", false);
        svc.database().execute(Insert(extra.clone())).await.unwrap();

        let err = svc
            .execute(EditReceipt {
                receipt_id: receipt.id,
                line_items: vec![LineItemRequest {
                    fee_id: extra.id,
                    quantity: "1".parse().unwrap(),
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ReceiptLocked(_)));
    }

    #[tokio::test]
    async fn rejects_paid_receipt() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;
        let _ = svc
            .execute(RecordPayment {
                receipt_id: receipt.id,
                amount: money("300000"),
                method: receipt::PaymentMethod::new("chuyển khoản").unwrap(),
                recorder_id: operator(),
            })
            .await
            .unwrap();
        let extra = fee("Phí vệ sinh", Method::PerResident, "6000", false);
        svc.database().execute(Insert(extra.clone())).await.unwrap();

        let err = svc
            .execute(EditReceipt {
                receipt_id: receipt.id,
                line_items: vec![LineItemRequest {
                    fee_id: extra.id,
                    quantity: "1".parse().unwrap(),
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ReceiptLocked(_)));
    }

    #[tokio::test]
    async fn rejects_empty_replacement() {
        let svc = service();
        let receipt = assembled_receipt(&svc, "300000").await;

        let err = svc
            .execute(EditReceipt {
                receipt_id: receipt.id,
                line_items: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoLineItems));
    }
}
