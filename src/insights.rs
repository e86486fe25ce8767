use crate::error::{DashboardError, Result};
use crate::metrics::mean_answer_rate_pct;
use crate::types::{CallRecord, RateUnit};
use crate::util::average;
use serde::Serialize;

/// Seconds; above this the mean time to answer is flagged.
pub const RESPONSE_TIME_LIMIT_S: f64 = 60.0;
/// Percent; below this the mean answer rate is flagged.
pub const ANSWER_RATE_FLOOR_PCT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub severity: Severity,
    pub message: &'static str,
    /// The mean the rule was evaluated on.
    pub observed: f64,
}

impl Insight {
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

pub fn response_time_insight(view: &[CallRecord], year: i32) -> Result<Insight> {
    let times: Vec<f64> = view.iter().map(|r| r.avg_time_to_answer_s).collect();
    let observed = average(&times).ok_or(DashboardError::NoData { year })?;
    Ok(if observed > RESPONSE_TIME_LIMIT_S {
        Insight {
            severity: Severity::Warning,
            message: "Average response time is high. Consider improving team efficiency.",
            observed,
        }
    } else {
        Insight {
            severity: Severity::Success,
            message: "Average response time is within a good range.",
            observed,
        }
    })
}

pub fn answer_rate_insight(view: &[CallRecord], year: i32, unit: RateUnit) -> Result<Insight> {
    let observed = mean_answer_rate_pct(view, unit).ok_or(DashboardError::NoData { year })?;
    Ok(if observed < ANSWER_RATE_FLOOR_PCT {
        Insight {
            severity: Severity::Warning,
            message: "Answer rate is significantly low. Potential customer dissatisfaction.",
            observed,
        }
    } else {
        Insight {
            severity: Severity::Success,
            message: "Answer rate is stable.",
            observed,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::record;

    fn with_answer_time(secs: &[f64]) -> Vec<CallRecord> {
        secs.iter()
            .map(|s| {
                let mut r = record(2021, "Jan", 100, 90);
                r.avg_time_to_answer_s = *s;
                r
            })
            .collect()
    }

    #[test]
    fn mean_of_75_seconds_warns() {
        let view = with_answer_time(&[70.0, 80.0]);
        let i = response_time_insight(&view, 2021).unwrap();
        assert!(i.is_warning());
        assert_eq!(i.observed, 75.0);
    }

    #[test]
    fn exactly_sixty_seconds_is_good() {
        let view = with_answer_time(&[60.0]);
        let i = response_time_insight(&view, 2021).unwrap();
        assert_eq!(i.severity, Severity::Success);
    }

    #[test]
    fn answer_rate_threshold_respects_unit() {
        let view = vec![record(2021, "Jan", 100, 40)];
        let i = answer_rate_insight(&view, 2021, RateUnit::Fraction).unwrap();
        assert!(i.is_warning());

        let view = vec![record(2021, "Jan", 100, 90)];
        let i = answer_rate_insight(&view, 2021, RateUnit::Fraction).unwrap();
        assert_eq!(i.message, "Answer rate is stable.");

        let mut r = record(2021, "Jan", 100, 90);
        r.calls_answered_rate = 90.0;
        let i = answer_rate_insight(&[r], 2021, RateUnit::Percent).unwrap();
        assert!(!i.is_warning());
    }

    #[test]
    fn empty_view_is_no_data() {
        assert!(response_time_insight(&[], 2021).unwrap_err().is_no_data());
        assert!(answer_rate_insight(&[], 2021, RateUnit::Percent)
            .unwrap_err()
            .is_no_data());
    }
}
