//! [`Command`] for creating a new [`Fee`] definition.

use common::{operations::Insert, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{fee, Fee},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Fee`] definition.
///
/// The calculation-method label arrives as the free text an administrator
/// typed (or a legacy registry exported) and is normalized into a
/// [`fee::Method`] right here, before any computation can ever see it.
#[derive(Clone, Debug)]
pub struct CreateFee {
    /// [`Name`] of the new [`Fee`].
    ///
    /// [`Name`]: fee::Name
    pub name: fee::Name,

    /// Price of the new [`Fee`] per charged unit.
    pub unit_price: Money,

    /// Label of the charged unit.
    pub unit: Option<fee::UnitLabel>,

    /// Free-text label of the calculation method.
    pub method_label: String,

    /// Indicator whether the new [`Fee`] is charged to every eligible
    /// household automatically.
    pub mandatory: bool,

    /// [`Description`] of the new [`Fee`].
    ///
    /// [`Description`]: fee::Description
    pub description: Option<fee::Description>,
}

impl<Db> Command<CreateFee> for Service<Db>
where
    Db: Database<Insert<Fee>, Err = Traced<database::Error>>,
{
    type Ok = Fee;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateFee) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFee {
            name,
            unit_price,
            unit,
            method_label,
            mandatory,
            description,
        } = cmd;

        let method = fee::Method::from_label(&method_label);
        if matches!(method, fee::Method::Unrecognized) {
            tracing::warn!(
                %name,
                label = method_label,
                "unrecognized calculation-method label, fee will be charged \
                 as fixed per-household",
            );
        }

        let fee = Fee {
            id: fee::Id::new(),
            name,
            unit_price,
            unit,
            method,
            mandatory,
            description,
        };
        self.database()
            .execute(Insert(fee.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(fee)
    }
}

/// Error of [`CreateFee`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
