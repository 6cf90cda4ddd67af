//! [`Household`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{household, Household},
    infra::{
        database::{
            self,
            memory::{Access, Memory},
        },
        Database,
    },
    read,
};

impl<C: Access> Database<Select<By<Option<Household>, household::Id>>>
    for Memory<C>
{
    type Ok = Option<Household>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Household>, household::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with_state(|state| state.households.get(&id).cloned())
            .await
    }
}

impl<C: Access> Database<Select<By<Vec<Household>, read::household::Occupied>>>
    for Memory<C>
{
    type Ok = Vec<Household>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Household>, read::household::Occupied>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(|state| {
                state
                    .households
                    .values()
                    .filter(|h| h.is_occupied())
                    .cloned()
                    .sorted_by_key(|h| h.room)
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Household>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(household): Insert<Household>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.households.insert(household.id, household);
            })
            .await
    }
}
