use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

pub const COL_YEAR: &str = "Year";
pub const COL_MONTH: &str = "Month";
pub const COL_TOTAL_CALLS: &str = "Total Incoming Calls";
pub const COL_ANSWERED: &str = "Calls Answered";
pub const COL_ANSWER_RATE: &str = "Calls Answered Rate";
pub const COL_WAIT_TIME: &str = "Total Wait Time (min)";
pub const COL_TIME_TO_ANSWER: &str = "Avg Time to Answer (s)";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_YEAR,
    COL_MONTH,
    COL_TOTAL_CALLS,
    COL_ANSWERED,
    COL_ANSWER_RATE,
    COL_WAIT_TIME,
    COL_TIME_TO_ANSWER,
];

/// One CSV row exactly as it appears in the file. Cells stay strings so the
/// loader can report which value failed to parse.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Total Incoming Calls")]
    pub total_incoming_calls: Option<String>,
    #[serde(rename = "Calls Answered")]
    pub calls_answered: Option<String>,
    #[serde(rename = "Calls Answered Rate")]
    pub calls_answered_rate: Option<String>,
    #[serde(rename = "Total Wait Time (min)")]
    pub total_wait_time_min: Option<String>,
    #[serde(rename = "Avg Time to Answer (s)")]
    pub avg_time_to_answer_s: Option<String>,
}

/// A month cell: the label as written plus its 1-based month number when
/// one can be recognised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLabel {
    pub label: String,
    pub ordinal: Option<u32>,
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub year: i32,
    pub month: MonthLabel,
    pub total_incoming_calls: u64,
    pub calls_answered: u64,
    pub calls_answered_rate: f64,
    pub total_wait_time_min: f64,
    pub avg_time_to_answer_s: f64,
}

/// How the `Calls Answered Rate` column is stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    /// 0.0..=1.0
    #[default]
    Fraction,
    /// 0.0..=100.0
    Percent,
}

impl RateUnit {
    pub fn to_percent(self, value: f64) -> f64 {
        match self {
            RateUnit::Fraction => value * 100.0,
            RateUnit::Percent => value,
        }
    }
}

/// Prediction timeframe; selects which model is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
pub enum Horizon {
    Weekly,
    Monthly,
    Yearly,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Weekly, Horizon::Monthly, Horizon::Yearly];

    pub fn label(self) -> &'static str {
        match self {
            Horizon::Weekly => "Weekly",
            Horizon::Monthly => "Monthly",
            Horizon::Yearly => "Yearly",
        }
    }

    /// Suffix used in model artifact file names.
    pub fn artifact_suffix(self) -> &'static str {
        match self {
            Horizon::Weekly => "Week",
            Horizon::Monthly => "Month",
            Horizon::Yearly => "Year",
        }
    }

    pub fn next_period(self) -> &'static str {
        match self {
            Horizon::Weekly => "Next Week",
            Horizon::Monthly => "Next Month",
            Horizon::Yearly => "Next Year",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Model input: (Total Incoming Calls, Total Wait Time (min), Avg Time to Answer (s)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; 3]);

impl FeatureVector {
    pub const LEN: usize = 3;

    pub fn from_record(r: &CallRecord) -> Self {
        FeatureVector([
            r.total_incoming_calls as f64,
            r.total_wait_time_min,
            r.avg_time_to_answer_s,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub year: i32,
    pub total_calls: u64,
    pub answered_calls: u64,
    pub unanswered_calls: i64,
    pub answer_rate_pct: f64,
    /// `None` when the view has rows but no incoming calls.
    pub answered_percentage: Option<f64>,
    pub unanswered_percentage: Option<f64>,
}

#[derive(Debug, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Total Incoming Calls")]
    #[tabled(rename = "Total Incoming Calls")]
    pub total_incoming_calls: String,
    #[serde(rename = "Calls Answered")]
    #[tabled(rename = "Calls Answered")]
    pub calls_answered: String,
    #[serde(rename = "Calls Answered Rate")]
    #[tabled(rename = "Calls Answered Rate")]
    pub calls_answered_rate: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}
