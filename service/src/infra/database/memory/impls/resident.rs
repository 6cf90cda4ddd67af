//! [`Resident`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{household, Resident},
    infra::{
        database::{
            self,
            memory::{Access, Memory},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Vec<Resident>, household::Id>>>
    for Memory<C>
{
    type Ok = Vec<Resident>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Resident>, household::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let household_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .residents
                    .values()
                    .filter(|r| r.household_id == household_id)
                    .cloned()
                    .sorted_by_key(|r| r.name.to_string())
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Resident>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(resident): Insert<Resident>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.residents.insert(resident.id, resident);
            })
            .await
    }
}
