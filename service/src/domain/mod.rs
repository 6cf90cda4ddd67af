//! Domain definitions.

pub mod account;
pub mod fee;
pub mod household;
pub mod period;
pub mod receipt;
pub mod resident;
pub mod vehicle;

pub use self::{
    fee::Fee, household::Household, period::Period, receipt::Receipt,
    resident::Resident, vehicle::Vehicle,
};
