//! [`Command`] definition.

pub mod assemble_receipt;
pub mod close_period;
pub mod create_fee;
pub mod delete_fee;
pub mod delete_receipt;
pub mod edit_receipt;
pub mod generate_receipts;
pub mod record_payment;
pub mod void_receipt;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    assemble_receipt::AssembleReceipt,
    close_period::ClosePeriod,
    create_fee::CreateFee,
    delete_fee::DeleteFee,
    delete_receipt::DeleteReceipt,
    edit_receipt::EditReceipt,
    generate_receipts::{Cancellation, GenerateReceipts},
    record_payment::RecordPayment,
    void_receipt::VoidReceipt,
};

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared fixtures for [`Command`] tests.

    use common::{operations::Insert, Date, Money};

    use crate::{
        domain::{
            account, fee, household, period, resident, vehicle, Fee,
            Household, Period, Receipt, Resident, Vehicle,
        },
        infra::Memory,
        Command as _,
        Service,
    };

    use super::AssembleReceipt;

    /// Creates a [`Service`] on top of an empty [`Memory`] store.
    pub(crate) fn service() -> Service<Memory> {
        Service::new(Memory::new())
    }

    /// Parses a [`Money`] amount.
    pub(crate) fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    /// Creates an open collection [`Period`].
    pub(crate) fn open_period() -> Period {
        period("Tháng 3/2024", period::Status::Open)
    }

    /// Creates a closed collection [`Period`].
    pub(crate) fn closed_period() -> Period {
        period("Tháng 2/2024", period::Status::Closed)
    }

    fn period(name: &str, status: period::Status) -> Period {
        Period {
            id: period::Id::new(),
            name: period::Name::new(name).unwrap(),
            starts_on: Date::from_calendar(2024, 3, 1).unwrap(),
            ends_on: Date::from_calendar(2024, 3, 31).unwrap(),
            status,
            description: None,
        }
    }

    /// Creates an occupied [`Household`] with the given room number and
    /// living area.
    pub(crate) fn household(room: u16, area: Option<&str>) -> Household {
        Household {
            id: household::Id::new(),
            room: room.into(),
            owner_id: resident::Id::new(),
            area: area.map(|a| a.parse().unwrap()),
            status: household::Status::Occupied,
            note: None,
        }
    }

    /// Creates a [`Fee`] definition.
    pub(crate) fn fee(
        name: &str,
        method: fee::Method,
        unit_price: &str,
        mandatory: bool,
    ) -> Fee {
        Fee {
            id: fee::Id::new(),
            name: fee::Name::new(name).unwrap(),
            unit_price: money(unit_price),
            unit: None,
            method,
            mandatory,
            description: None,
        }
    }

    /// Creates an active [`Resident`] of the given [`Household`].
    pub(crate) fn resident(household_id: household::Id) -> Resident {
        Resident {
            id: resident::Id::new(),
            household_id,
            name: resident::Name::new("Nguyen Van A").unwrap(),
            is_active: true,
        }
    }

    /// Creates a [`Vehicle`] of the given [`Household`].
    pub(crate) fn vehicle(
        household_id: household::Id,
        label: &str,
    ) -> Vehicle {
        Vehicle {
            id: vehicle::Id::new(),
            household_id,
            plate: vehicle::PlateNumber::new("29A-123.45").unwrap(),
            label: vehicle::Label::new(label).unwrap(),
        }
    }

    /// Creates an operator account reference.
    pub(crate) fn operator() -> account::Id {
        account::Id::new()
    }

    /// Seeds the store with an open period, an occupied household and a
    /// single fixed mandatory fee of the given `total`, then assembles a
    /// [`Receipt`] out of them.
    pub(crate) async fn assembled_receipt(
        svc: &Service<Memory>,
        total: &str,
    ) -> Receipt {
        let period = open_period();
        let h = household(901, None);
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database().execute(Insert(h.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee(
                "Phí quản lý",
                fee::Method::PerHousehold,
                total,
                true,
            )))
            .await
            .unwrap();

        let (receipt, _) = svc
            .execute(AssembleReceipt {
                household_id: h.id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: None,
            })
            .await
            .unwrap();
        receipt
    }
}
