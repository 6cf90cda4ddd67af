//! [`Command`] for assembling a new [`Receipt`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        account, fee, household, period, receipt,
        receipt::{line_item, LineItem},
        Fee, Household, Period, Receipt, Resident, Vehicle,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// Request for a single [`LineItem`] of an assembled [`Receipt`].
#[derive(Clone, Copy, Debug)]
pub struct LineItemRequest {
    /// ID of the [`Fee`] to bill.
    pub fee_id: fee::Id,

    /// Billed quantity of the [`Fee`]'s unit.
    pub quantity: line_item::Quantity,
}

/// [`Command`] for assembling a new [`Receipt`].
#[derive(Clone, Debug)]
pub struct AssembleReceipt {
    /// ID of the [`Household`] to bill.
    pub household_id: household::Id,

    /// ID of the [`Period`] to assemble the [`Receipt`] for.
    pub period_id: period::Id,

    /// ID of the account preparing the [`Receipt`].
    pub preparer_id: account::Id,

    /// Payment method label, if already agreed upon.
    pub method: Option<receipt::PaymentMethod>,

    /// Exact line items to bill, for manual/adjusted receipts.
    ///
    /// [`None`] derives the line items from the mandatory [`Fee`]s and the
    /// [`Household`]'s current attributes instead.
    pub line_items: Option<Vec<LineItemRequest>>,
}

impl<Db> Command<AssembleReceipt> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Period>, period::Id>>,
            Ok = Option<Period>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Household>, household::Id>>,
            Ok = Option<Household>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Fee>, fee::Id>>,
            Ok = Option<Fee>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Fee>, read::fee::Mandatory>>,
            Ok = Vec<Fee>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Resident>, household::Id>>,
            Ok = Vec<Resident>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Vehicle>, household::Id>>,
            Ok = Vec<Vehicle>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Receipt, (household::Id, period::Id)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Receipt>, (household::Id, period::Id)>>,
            Ok = Option<Receipt>,
            Err = Traced<database::Error>,
        > + Database<Insert<Receipt>, Err = Traced<database::Error>>
        + Database<Insert<Vec<LineItem>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = (Receipt, Vec<LineItem>);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AssembleReceipt,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssembleReceipt {
            household_id,
            period_id,
            preparer_id,
            method,
            line_items,
        } = cmd;

        let period = self
            .database()
            .execute(Select(By::<Option<Period>, _>::new(period_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PeriodNotExists(period_id))
            .map_err(tracerr::wrap!())?;
        if !period.is_open() {
            return Err(tracerr::new!(E::PeriodClosed(period.id)));
        }

        let household = self
            .database()
            .execute(Select(By::<Option<Household>, _>::new(household_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::HouseholdNotExists(household_id))
            .map_err(tracerr::wrap!())?;
        if !household.is_occupied() {
            return Err(tracerr::new!(E::HouseholdNotOccupied(household.id)));
        }

        let receipt_id = receipt::Id::new();
        let items = match line_items {
            Some(requests) => {
                if requests.is_empty() {
                    return Err(tracerr::new!(E::NoLineItems));
                }

                let mut items = Vec::with_capacity(requests.len());
                for request in requests {
                    let fee = self
                        .database()
                        .execute(Select(By::<Option<Fee>, _>::new(
                            request.fee_id,
                        )))
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
                items
            }
            None => {
                let fees = self
                    .database()
                    .execute(Select(By::<Vec<Fee>, _>::new(
                        read::fee::Mandatory,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let residents = self
                    .database()
                    .execute(Select(By::<Vec<Resident>, _>::new(
                        household.id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let vehicles = self
                    .database()
                    .execute(Select(By::<Vec<Vehicle>, _>::new(household.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                let profile =
                    household::Profile::new(&household, &residents, &vehicles);
                fees.iter()
                    .filter_map(|fee| {
                        let quantity = line_item::Quantity::new(
                            fee.multiplier(&profile),
                        )?;
                        let item = LineItem::compute(
                            receipt_id,
                            fee.id,
                            quantity,
                            fee.unit_price,
                        );
                        // Fees resolving to a zero amount don't apply to the
                        // household and produce no line at all.
                        (!item.amount.is_zero()).then_some(item)
                    })
                    .collect()
            }
        };
        if items.is_empty() {
            return Err(tracerr::new!(E::NoApplicableFees(household.id)));
        }

        let total = LineItem::total(&items);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent receipt creation for the same household and
        // period.
        tx.execute(Lock(By::<Receipt, _>::new((household.id, period.id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(existing) = tx
            .execute(Select(By::<Option<Receipt>, _>::new((
                household.id,
                period.id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        {
            return Err(tracerr::new!(E::DuplicateReceipt(existing.id)));
        }

        let receipt = Receipt {
            id: receipt_id,
            household_id: household.id,
            period_id: period.id,
            preparer_id,
            created_at: DateTime::now().coerce(),
            total,
            status: receipt::Status::Unpaid,
            method,
        };
        tx.execute(Insert(receipt.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(items.clone()))
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

/// Error of [`AssembleReceipt`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// A non-voided [`Receipt`] already exists for the household in the
    /// period.
    #[display("`Receipt(id: {_0})` already exists for the household in the \
               period")]
    DuplicateReceipt(#[error(not(source))] receipt::Id),

    /// [`Fee`] with the provided ID does not exist.
    #[display("`Fee(id: {_0})` does not exist")]
    FeeNotExists(#[error(not(source))] fee::Id),

    /// [`Household`] with the provided ID does not exist.
    #[display("`Household(id: {_0})` does not exist")]
    HouseholdNotExists(#[error(not(source))] household::Id),

    /// [`Household`] no longer occupies its room.
    #[display("`Household(id: {_0})` is not occupied")]
    HouseholdNotOccupied(#[error(not(source))] household::Id),

    /// No mandatory [`Fee`] applies to the [`Household`].
    #[display("no mandatory fee applies to `Household(id: {_0})`")]
    NoApplicableFees(#[error(not(source))] household::Id),

    /// Explicit line items were provided, but the list is empty.
    #[display("empty list of line items provided")]
    NoLineItems,

    /// [`Period`] is closed for new [`Receipt`]s.
    #[display("`Period(id: {_0})` is closed")]
    PeriodClosed(#[error(not(source))] period::Id),

    /// [`Period`] with the provided ID does not exist.
    #[display("`Period(id: {_0})` does not exist")]
    PeriodNotExists(#[error(not(source))] period::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use super::{AssembleReceipt, ExecutionError, LineItemRequest};
    use crate::{
        command::fixtures::{
            closed_period, fee, household, money, open_period, operator,
            resident, service, vehicle,
        },
        domain::{fee::Method, household, receipt},
        Command as _,
    };

    #[tokio::test]
    async fn derives_area_fee_line() {
        let svc = service();
        let period = open_period();
        let h = household(101, Some("45.5"));
        let management = fee("Phí quản lý", Method::PerArea, "5000", true);
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database().execute(Insert(management.clone())).await.unwrap();

        let (receipt, items) = svc
            .execute(AssembleReceipt {
                household_id: h.id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: None,
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fee_id, management.id);
        assert_eq!(items[0].amount, money("227500"));
        assert_eq!(receipt.total, money("227500"));
        assert_eq!(receipt.status, receipt::Status::Unpaid);
    }

    #[tokio::test]
    async fn derives_all_applicable_mandatory_fees() {
        let svc = service();
        let period = open_period();
        let h = household(202, Some("30"));
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database()
            .execute(Insert(resident(h.id)))
            .await
            .unwrap();
        svc.database()
            .execute(Insert(vehicle(h.id, "Xe máy")))
            .await
            .unwrap();
        for f in [
            fee("Phí quản lý", Method::PerArea, "5000", true),
            fee("Phí vệ sinh", Method::PerResident, "6000", true),
            fee("Gửi xe máy", Method::PerMotorbike, "70000", true),
            fee("Gửi ô tô", Method::PerCar, "1200000", true),
            fee("Quỹ từ thiện", Method::PerHousehold, "50000", false),
        ] {
            svc.database().execute(Insert(f)).await.unwrap();
        }

        let (receipt, items) = svc
            .execute(AssembleReceipt {
                household_id: h.id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: None,
            })
            .await
            .unwrap();

        // Car fee doesn't apply (no car), voluntary fund isn't mandatory.
        assert_eq!(items.len(), 3);
        assert_eq!(receipt.total, money("226000"));
    }

    #[tokio::test]
    async fn snapshots_unit_prices_in_explicit_mode() {
        let svc = service();
        let period = open_period();
        let h = household(303, None);
        let f = fee("Phí vệ sinh", Method::PerResident, "6000", true);
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database().execute(Insert(f.clone())).await.unwrap();

        let (receipt, items) = svc
            .execute(AssembleReceipt {
                household_id: h.id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: Some(vec![LineItemRequest {
                    fee_id: f.id,
                    quantity: "3".parse().unwrap(),
                }]),
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, money("6000"));
        assert_eq!(items[0].amount, money("18000"));
        assert_eq!(receipt.total, money("18000"));
    }

    #[tokio::test]
    async fn fails_on_closed_period() {
        let svc = service();
        let period = closed_period();
        let h = household(404, Some("20"));
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();

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

        assert!(matches!(err.as_ref(), ExecutionError::PeriodClosed(_)));
    }

    #[tokio::test]
    async fn fails_without_applicable_fees() {
        let svc = service();
        let period = open_period();
        let h = household(505, None);
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        // The only mandatory fee scales by an area the household lacks.
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();

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

        assert!(matches!(err.as_ref(), ExecutionError::NoApplicableFees(_)));
    }

    #[tokio::test]
    async fn fails_on_historical_household() {
        let svc = service();
        let period = open_period();
        let mut h = household(606, Some("20"));
        h.status = household::Status::Historical;
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();

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
            ExecutionError::HouseholdNotOccupied(_),
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_receipt() {
        let svc = service();
        let period = open_period();
        let h = household(707, Some("45.5"));
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();

        let cmd = AssembleReceipt {
            household_id: h.id,
            period_id: period.id,
            preparer_id: operator(),
            method: None,
            line_items: None,
        };
        let (first, _) = svc.execute(cmd.clone()).await.unwrap();

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateReceipt(id) if *id == first.id,
        ));
    }
}
