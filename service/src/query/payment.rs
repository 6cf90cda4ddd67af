//! [`Query`] collection related to [`Payment`]s.

use common::operations::By;

use crate::domain::{household, receipt, receipt::Payment};
#[cfg(doc)]
use crate::{
    domain::{Household, Receipt},
    Query,
};

use super::DatabaseQuery;

/// Queries the [`Payment`]s recorded against a [`Receipt`], newest first.
pub type ForReceipt = DatabaseQuery<By<Vec<Payment>, receipt::Id>>;

/// Queries the [`Payment`]s recorded against all [`Receipt`]s of a
/// [`Household`], newest first.
pub type ForHousehold = DatabaseQuery<By<Vec<Payment>, household::Id>>;
