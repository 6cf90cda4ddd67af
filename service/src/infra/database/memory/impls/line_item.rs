//! [`LineItem`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Replace, Select};
use tracerr::Traced;

use crate::{
    domain::{fee, receipt, receipt::LineItem},
    infra::{
        database::{
            self,
            memory::{Access, Memory},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Vec<LineItem>, receipt::Id>>>
    for Memory<C>
{
    type Ok = Vec<LineItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<LineItem>, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let receipt_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .line_items
                    .iter()
                    .filter(|i| i.receipt_id == receipt_id)
                    .cloned()
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Select<By<Vec<LineItem>, fee::Id>>> for Memory<C> {
    type Ok = Vec<LineItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<LineItem>, fee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let fee_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .line_items
                    .iter()
                    .filter(|i| i.fee_id == fee_id)
                    .cloned()
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Vec<LineItem>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(items): Insert<Vec<LineItem>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| state.line_items.extend(items))
            .await
    }
}

// Replaces all line items of the owning receipt with the provided ones.
// Callers guarantee the provided items all belong to one receipt.
impl<C: Access> Database<Replace<Vec<LineItem>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Replace(items): Replace<Vec<LineItem>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(receipt_id) = items.first().map(|i| i.receipt_id) else {
            return Ok(());
        };
        self.0
            .with_state(move |state| {
                state.line_items.retain(|i| i.receipt_id != receipt_id);
                state.line_items.extend(items);
            })
            .await
    }
}

impl<C: Access> Database<Delete<By<Vec<LineItem>, receipt::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<LineItem>, receipt::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let receipt_id = by.into_inner();
        self.0
            .with_state(move |state| {
                state.line_items.retain(|i| i.receipt_id != receipt_id);
            })
            .await
    }
}
