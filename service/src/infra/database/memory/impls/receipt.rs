//! [`Receipt`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{household, period, receipt, Receipt},
    infra::{
        database::{
            self,
            memory::{Access, Memory, Tx},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Option<Receipt>, receipt::Id>>>
    for Memory<C>
{
    type Ok = Option<Receipt>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Receipt>, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with_state(|state| state.receipts.get(&id).cloned())
            .await
    }
}

/// Selects the non-voided [`Receipt`] of the household in the period, if any.
///
/// Voided receipts don't block creating a replacement, so they're invisible
/// to this selector.
impl<C: Access>
    Database<Select<By<Option<Receipt>, (household::Id, period::Id)>>>
    for Memory<C>
{
    type Ok = Option<Receipt>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Receipt>, (household::Id, period::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (household_id, period_id) = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .receipts
                    .values()
                    .find(|r| {
                        r.household_id == household_id
                            && r.period_id == period_id
                            && !matches!(r.status, receipt::Status::Voided)
                    })
                    .cloned()
            })
            .await
    }
}

impl<C: Access> Database<Select<By<Vec<Receipt>, household::Id>>>
    for Memory<C>
{
    type Ok = Vec<Receipt>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Receipt>, household::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let household_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .receipts
                    .values()
                    .filter(|r| r.household_id == household_id)
                    .cloned()
                    .sorted_by_key(|r| r.created_at)
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Select<By<Vec<Receipt>, period::Id>>> for Memory<C> {
    type Ok = Vec<Receipt>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Receipt>, period::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .receipts
                    .values()
                    .filter(|r| r.period_id == period_id)
                    .cloned()
                    .sorted_by_key(|r| r.created_at)
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Receipt>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(receipt): Insert<Receipt>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.receipts.insert(receipt.id, receipt);
            })
            .await
    }
}

impl<C: Access> Database<Update<Receipt>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(receipt): Update<Receipt>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.receipts.insert(receipt.id, receipt);
            })
            .await
    }
}

impl<C: Access> Database<Delete<By<Receipt, receipt::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Receipt, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with_state(move |state| {
                let _ = state.receipts.remove(&id);
            })
            .await
    }
}

impl Database<Lock<By<Receipt, receipt::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Receipt, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The transaction owns the whole `State` exclusively already.
        self.0.with_state(|_| ()).await
    }
}

impl Database<Lock<By<Receipt, (household::Id, period::Id)>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Receipt, (household::Id, period::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The transaction owns the whole `State` exclusively already.
        self.0.with_state(|_| ()).await
    }
}
