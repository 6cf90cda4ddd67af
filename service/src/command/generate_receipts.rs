//! [`Command`] for generating [`Receipt`]s for a whole collection
//! [`Period`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        account, household, period, receipt::LineItem, Household, Period,
        Receipt,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::{assemble_receipt, AssembleReceipt, Command};

/// Cooperative cancellation flag of a [`GenerateReceipts`] run.
///
/// Checked between households, so cancelling a long run stops it from
/// creating further [`Receipt`]s while keeping the already created ones
/// valid.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Creates a new non-cancelled [`Cancellation`] flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the run holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Indicates whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// [`Command`] for generating [`Receipt`]s for every occupied [`Household`]
/// in a collection [`Period`].
///
/// Safely repeatable: households already billed for the [`Period`] are
/// skipped, so re-running a partially generated period only fills the gaps.
#[derive(Clone, Debug)]
pub struct GenerateReceipts {
    /// ID of the [`Period`] to generate [`Receipt`]s for.
    pub period_id: period::Id,

    /// ID of the account preparing the [`Receipt`]s.
    pub preparer_id: account::Id,

    /// [`Cancellation`] flag of this run.
    pub cancel: Cancellation,
}

/// Outcome of a [`GenerateReceipts`] [`Command`] execution.
#[derive(Debug, Default)]
pub struct Report {
    /// Number of [`Receipt`]s created by the run.
    pub created: usize,

    /// Number of [`Household`]s skipped because a non-voided [`Receipt`]
    /// already existed.
    pub skipped: usize,

    /// Per-[`Household`] failures. A failed household never aborts the
    /// remaining ones.
    pub failures: Vec<Failure>,

    /// Indicator whether the run was cancelled before processing every
    /// [`Household`].
    pub cancelled: bool,
}

/// Failed [`Receipt`] generation attempt for a single [`Household`].
#[derive(Debug, Display)]
#[display("`Household(id: {household_id})`: {reason}")]
pub struct Failure {
    /// ID of the [`Household`] the attempt was made for.
    pub household_id: household::Id,

    /// Reason of the failure.
    pub reason: Traced<assemble_receipt::ExecutionError>,
}

impl<Db> Command<GenerateReceipts> for Service<Db>
where
    Db: Database<
            Select<By<Option<Period>, period::Id>>,
            Ok = Option<Period>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Household>, read::household::Occupied>>,
            Ok = Vec<Household>,
            Err = Traced<database::Error>,
        >,
    Self: Command<
        AssembleReceipt,
        Ok = (Receipt, Vec<LineItem>),
        Err = Traced<assemble_receipt::ExecutionError>,
    >,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GenerateReceipts,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateReceipts {
            period_id,
            preparer_id,
            cancel,
        } = cmd;

        let period = self
            .database()
            .execute(Select(By::<Option<Period>, _>::new(period_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PeriodNotExists(period_id))
            .map_err(tracerr::wrap!())?;
        if !period.is_open() {
            // Fail fast before touching any household.
            return Err(tracerr::new!(E::PeriodClosed(period.id)));
        }

        let households = self
            .database()
            .execute(Select(By::<Vec<Household>, _>::new(
                read::household::Occupied,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut report = Report::default();
        for household in households {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            // Every household is assembled in its own transaction, so one
            // failure cannot roll back receipts of its siblings.
            let assembled = self
                .execute(AssembleReceipt {
                    household_id: household.id,
                    period_id: period.id,
                    preparer_id,
                    method: None,
                    line_items: None,
                })
                .await;
            match assembled {
                Ok(_) => report.created += 1,
                Err(reason) => {
                    if matches!(
                        reason.as_ref(),
                        assemble_receipt::ExecutionError::DuplicateReceipt(_),
                    ) {
                        report.skipped += 1;
                    } else {
                        report.failures.push(Failure {
                            household_id: household.id,
                            reason,
                        });
                    }
                }
            }
        }

        tracing::info!(
            period_id = %period.id,
            created = report.created,
            skipped = report.skipped,
            failures = report.failures.len(),
            cancelled = report.cancelled,
            "receipt generation finished",
        );

        Ok(report)
    }
}

/// Error of [`GenerateReceipts`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Period`] is closed for new [`Receipt`]s.
    #[display("`Period(id: {_0})` is closed")]
    PeriodClosed(#[error(not(source))] period::Id),

    /// [`Period`] with the provided ID does not exist.
    #[display("`Period(id: {_0})` does not exist")]
    PeriodNotExists(#[error(not(source))] period::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use super::{Cancellation, ExecutionError, GenerateReceipts};
    use crate::{
        command::{
            assemble_receipt,
            fixtures::{
                closed_period, fee, household, open_period, operator, service,
            },
            AssembleReceipt,
        },
        domain::{fee::Method, household},
        Command as _,
    };

    #[tokio::test]
    async fn skips_households_billed_already() {
        let svc = service();
        let period = open_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();
        let households = [
            household(101, Some("45.5")),
            household(102, Some("60")),
            household(103, Some("72.5")),
        ];
        for h in &households {
            svc.database().execute(Insert(h.clone())).await.unwrap();
        }
        // Households that moved out are not enumerated at all.
        let mut moved_out = household(104, Some("45.5"));
        moved_out.status = household::Status::Historical;
        svc.database().execute(Insert(moved_out)).await.unwrap();
        // One household was billed manually beforehand.
        let _ = svc
            .execute(AssembleReceipt {
                household_id: households[0].id,
                period_id: period.id,
                preparer_id: operator(),
                method: None,
                line_items: None,
            })
            .await
            .unwrap();

        let report = svc
            .execute(GenerateReceipts {
                period_id: period.id,
                preparer_id: operator(),
                cancel: Cancellation::new(),
            })
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let svc = service();
        let period = open_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();
        for room in [101, 102, 103, 104] {
            svc.database()
                .execute(Insert(household(room, Some("45.5"))))
                .await
                .unwrap();
        }

        let cmd = GenerateReceipts {
            period_id: period.id,
            preparer_id: operator(),
            cancel: Cancellation::new(),
        };
        let first = svc.execute(cmd.clone()).await.unwrap();
        assert_eq!(first.created, 4);
        assert_eq!(first.skipped, 0);

        let second = svc.execute(cmd).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 4);
        assert!(second.failures.is_empty());
    }

    #[tokio::test]
    async fn fails_fast_on_closed_period() {
        let svc = service();
        let period = closed_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database()
            .execute(Insert(household(101, Some("45.5"))))
            .await
            .unwrap();

        let err = svc
            .execute(GenerateReceipts {
                period_id: period.id,
                preparer_id: operator(),
                cancel: Cancellation::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PeriodClosed(_)));
    }

    #[tokio::test]
    async fn collects_failures_without_aborting_siblings() {
        let svc = service();
        let period = open_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();
        // The first household has no registered area, so no mandatory fee
        // applies to it.
        let broken = household(101, None);
        svc.database().execute(Insert(broken.clone())).await.unwrap();
        svc.database()
            .execute(Insert(household(102, Some("60"))))
            .await
            .unwrap();

        let report = svc
            .execute(GenerateReceipts {
                period_id: period.id,
                preparer_id: operator(),
                cancel: Cancellation::new(),
            })
            .await
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].household_id, broken.id);
        assert!(matches!(
            report.failures[0].reason.as_ref(),
            assemble_receipt::ExecutionError::NoApplicableFees(_),
        ));
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let svc = service();
        let period = open_period();
        svc.database().execute(Insert(period.clone())).await.unwrap();
        svc.database()
            .execute(Insert(fee("Phí quản lý", Method::PerArea, "5000", true)))
            .await
            .unwrap();
        svc.database()
            .execute(Insert(household(101, Some("45.5"))))
            .await
            .unwrap();

        let cancel = Cancellation::new();
        cancel.cancel();

        let report = svc
            .execute(GenerateReceipts {
                period_id: period.id,
                preparer_id: operator(),
                cancel,
            })
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.created, 0);
    }
}
