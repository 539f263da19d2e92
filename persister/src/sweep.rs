use crate::VehiclePersisterExt;
use crate::error::PersisterError;
use chrono::{Duration, NaiveDateTime};
use tracing::{error, info, instrument};

/// Longest retention window accepted from callers, roughly a century.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub candidates: usize,
    pub deleted: usize,
    /// Candidates relisted or removed by someone else before their delete ran.
    pub skipped: usize,
    pub failed: usize,
}

/// Hard-deletes every sold vehicle whose retention ran out by `now`. A failing delete is logged
/// and counted, the remaining candidates are still processed. Only listing the candidates can
/// fail the sweep as a whole.
#[instrument(skip(persister))]
pub async fn purge_sold<P>(
    persister: &P,
    retention: Duration,
    now: NaiveDateTime,
) -> Result<SweepReport, PersisterError>
where
    P: VehiclePersisterExt + ?Sized,
{
    let cutoff = now
        .checked_sub_signed(retention)
        .ok_or(PersisterError::RetentionOutOfRange(retention.num_days()))?;
    let candidates = persister.expired_sold(cutoff).await?;
    let mut report = SweepReport {
        candidates: candidates.len(),
        ..SweepReport::default()
    };

    for inventory_number in &candidates {
        match persister.delete_expired_sold(inventory_number, cutoff).await {
            Ok(true) => report.deleted += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                error!(persister_error = ?e, %inventory_number, "delete sold vehicle failed");
                report.failed += 1;
            }
        }
    }

    info!(
        %cutoff,
        candidates = report.candidates,
        deleted = report.deleted,
        skipped = report.skipped,
        failed = report.failed,
        "sold sweep finished"
    );
    Ok(report)
}
