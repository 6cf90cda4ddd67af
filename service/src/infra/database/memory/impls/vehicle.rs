//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{household, Vehicle},
    infra::{
        database::{
            self,
            memory::{Access, Memory},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Vec<Vehicle>, household::Id>>>
    for Memory<C>
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, household::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let household_id = by.into_inner();
        self.0
            .with_state(|state| {
                state
                    .vehicles
                    .values()
                    .filter(|v| v.household_id == household_id)
                    .cloned()
                    .sorted_by_key(|v| v.plate.to_string())
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Vehicle>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.vehicles.insert(vehicle.id, vehicle);
            })
            .await
    }
}
