use crate::error::{DashboardError, Result};
use crate::types::{CallRecord, Kpis, RateUnit, COL_ANSWERED, COL_TOTAL_CALLS};
use crate::util::{average, round2};

/// Rows for `year`, in dataset order.
pub fn filter_by_year(data: &[CallRecord], year: i32) -> Vec<CallRecord> {
    data.iter().filter(|r| r.year == year).cloned().collect()
}

/// Aggregate KPIs over a filtered view.
///
/// An empty view is `NoData`. A view whose incoming calls sum to zero still
/// yields totals, but the answered/unanswered percentages are `None`.
pub fn compute_kpis(view: &[CallRecord], year: i32, unit: RateUnit) -> Result<Kpis> {
    let mean_rate = mean_answer_rate_pct(view, unit).ok_or(DashboardError::NoData { year })?;

    let total_calls = checked_total(view, year, COL_TOTAL_CALLS, |r| r.total_incoming_calls)?;
    let answered_calls = checked_total(view, year, COL_ANSWERED, |r| r.calls_answered)?;
    // Both totals are within i64, so the difference cannot wrap.
    let unanswered_calls = total_calls as i64 - answered_calls as i64;

    let (answered_percentage, unanswered_percentage) = if total_calls == 0 {
        (None, None)
    } else {
        let total = total_calls as f64;
        (
            Some(round2(answered_calls as f64 / total * 100.0)),
            Some(round2(unanswered_calls as f64 / total * 100.0)),
        )
    };

    Ok(Kpis {
        year,
        total_calls,
        answered_calls,
        unanswered_calls,
        answer_rate_pct: round2(mean_rate),
        answered_percentage,
        unanswered_percentage,
    })
}

/// Sum of one count column, kept within `i64` so signed differences stay exact.
fn checked_total(
    view: &[CallRecord],
    year: i32,
    column: &'static str,
    count: impl Fn(&CallRecord) -> u64,
) -> Result<u64> {
    view.iter()
        .try_fold(0u64, |acc, r| {
            acc.checked_add(count(r)).filter(|s| *s <= i64::MAX as u64)
        })
        .ok_or(DashboardError::CountOverflow { year, column })
}

/// Mean of `Calls Answered Rate` expressed in percent, or `None` for an
/// empty view.
pub fn mean_answer_rate_pct(view: &[CallRecord], unit: RateUnit) -> Option<f64> {
    let rates: Vec<f64> = view
        .iter()
        .map(|r| unit.to_percent(r.calls_answered_rate))
        .collect();
    average(&rates)
}
