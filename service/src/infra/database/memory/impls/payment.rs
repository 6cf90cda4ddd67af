//! [`Payment`]-related [`Database`] implementations.

use std::collections::HashSet;

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{household, receipt, receipt::Payment},
    infra::{
        database::{
            self,
            memory::{Access, Memory},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Vec<Payment>, receipt::Id>>>
    for Memory<C>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let receipt_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .payments
                    .iter()
                    .filter(|p| p.receipt_id == receipt_id)
                    .cloned()
                    .sorted_by(|a, b| b.paid_at.cmp(&a.paid_at))
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Select<By<Vec<Payment>, household::Id>>>
    for Memory<C>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, household::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let household_id = by.into_inner();
        self.0
            .with_state(|state| {
                let receipts = state
                    .receipts
                    .values()
                    .filter(|r| r.household_id == household_id)
                    .map(|r| r.id)
                    .collect::<HashSet<_>>();
                state
                    .payments
                    .iter()
                    .filter(|p| receipts.contains(&p.receipt_id))
                    .cloned()
                    .sorted_by(|a, b| b.paid_at.cmp(&a.paid_at))
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| state.payments.push(payment))
            .await
    }
}
