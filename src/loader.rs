use crate::error::{DashboardError, Result};
use crate::types::{
    CallRecord, MonthLabel, RateUnit, RawRow, COL_ANSWERED, COL_ANSWER_RATE, COL_MONTH,
    COL_TIME_TO_ANSWER, COL_TOTAL_CALLS, COL_WAIT_TIME, COL_YEAR, REQUIRED_COLUMNS,
};
use crate::util::{parse_count_safe, parse_f64_safe, parse_i32_safe, parse_month_ordinal};
use csv::ReaderBuilder;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the dataset comes from: the configured file, or a file the user
/// uploaded for this session. Uploads stay in memory.
#[derive(Debug, Clone)]
pub enum DataSource {
    Fixed(PathBuf),
    Upload { file_name: String, bytes: Vec<u8> },
}

impl DataSource {
    /// Read an upload from disk, accepting only `.csv` files.
    pub fn upload_from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::check_upload_name(&file_name)?;
        let bytes = std::fs::read(&path).map_err(|e| DashboardError::io(&path, e))?;
        Ok(DataSource::Upload { file_name, bytes })
    }

    pub fn check_upload_name(file_name: &str) -> Result<()> {
        if file_name.to_ascii_lowercase().ends_with(".csv") {
            Ok(())
        } else {
            Err(DashboardError::UnsupportedUpload(file_name.to_string()))
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, DataSource::Upload { .. })
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Fixed(p) => write!(f, "{}", p.display()),
            DataSource::Upload { file_name, .. } => write!(f, "upload '{}'", file_name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub source: String,
    pub total_rows: usize,
    /// Distinct years in first-appearance order.
    pub years: Vec<i32>,
}

pub fn load_dataset(source: &DataSource, unit: RateUnit) -> Result<(Vec<CallRecord>, LoadReport)> {
    let records = match source {
        DataSource::Fixed(path) => {
            let file = std::fs::File::open(path).map_err(|e| DashboardError::io(path, e))?;
            read_records(file, unit)?
        }
        DataSource::Upload { bytes, .. } => read_records(bytes.as_slice(), unit)?,
    };
    let report = LoadReport {
        source: source.to_string(),
        total_rows: records.len(),
        years: distinct_years(&records),
    };
    info!(
        source = %report.source,
        rows = report.total_rows,
        years = report.years.len(),
        "dataset loaded"
    );
    Ok((records, report))
}

/// Parse a CSV stream with the seven dashboard columns. Extra columns are
/// ignored; a missing column or an unparsable cell fails the whole load.
/// A `%`-suffixed rate is only accepted when the rate unit is percent.
pub fn read_records<R: Read>(input: R, unit: RateUnit) -> Result<Vec<CallRecord>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns(missing));
    }

    let mut out = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row_no = idx + 1;
        let raw = result?;
        out.push(clean_row(row_no, raw, unit)?);
    }
    debug!(rows = out.len(), "parsed CSV records");
    Ok(out)
}

fn clean_row(row: usize, raw: RawRow, unit: RateUnit) -> Result<CallRecord> {
    fn invalid(row: usize, column: &'static str, value: &Option<String>) -> DashboardError {
        DashboardError::InvalidValue {
            row,
            column,
            value: value.clone().unwrap_or_default(),
        }
    }

    let year =
        parse_i32_safe(raw.year.as_deref()).ok_or_else(|| invalid(row, COL_YEAR, &raw.year))?;
    let label = raw
        .month
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(row, COL_MONTH, &raw.month))?
        .to_string();
    let total_incoming_calls = parse_count_safe(raw.total_incoming_calls.as_deref())
        .ok_or_else(|| invalid(row, COL_TOTAL_CALLS, &raw.total_incoming_calls))?;
    let calls_answered = parse_count_safe(raw.calls_answered.as_deref())
        .ok_or_else(|| invalid(row, COL_ANSWERED, &raw.calls_answered))?;
    let rate_cell = raw.calls_answered_rate.as_deref();
    if unit == RateUnit::Fraction && rate_cell.is_some_and(|c| c.trim().ends_with('%')) {
        return Err(invalid(row, COL_ANSWER_RATE, &raw.calls_answered_rate));
    }
    let calls_answered_rate = parse_f64_safe(rate_cell)
        .ok_or_else(|| invalid(row, COL_ANSWER_RATE, &raw.calls_answered_rate))?;
    let total_wait_time_min = parse_f64_safe(raw.total_wait_time_min.as_deref())
        .ok_or_else(|| invalid(row, COL_WAIT_TIME, &raw.total_wait_time_min))?;
    let avg_time_to_answer_s = parse_f64_safe(raw.avg_time_to_answer_s.as_deref())
        .ok_or_else(|| invalid(row, COL_TIME_TO_ANSWER, &raw.avg_time_to_answer_s))?;

    let ordinal = parse_month_ordinal(&label);
    Ok(CallRecord {
        year,
        month: MonthLabel { label, ordinal },
        total_incoming_calls,
        calls_answered,
        calls_answered_rate,
        total_wait_time_min,
        avg_time_to_answer_s,
    })
}

/// Distinct `Year` values in the order they first appear.
pub fn distinct_years(data: &[CallRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = Vec::new();
    for r in data {
        if !years.contains(&r.year) {
            years.push(r.year);
        }
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Year,Month,Total Incoming Calls,Calls Answered,Calls Answered Rate,Total Wait Time (min),Avg Time to Answer (s)";

    fn csv_with(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s
    }

    #[test]
    fn reads_typed_records() {
        let data = csv_with(&[
            "2021,January,\"1,000\",800,0.8,120.5,45",
            "2021,February,500,450,0.9,60,30",
        ]);
        let recs = read_records(data.as_bytes(), RateUnit::Fraction).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].year, 2021);
        assert_eq!(recs[0].month.label, "January");
        assert_eq!(recs[0].month.ordinal, Some(1));
        assert_eq!(recs[0].total_incoming_calls, 1000);
        assert_eq!(recs[1].calls_answered, 450);
        assert_eq!(recs[1].avg_time_to_answer_s, 30.0);
    }

    #[test]
    fn extra_columns_and_order_are_tolerated() {
        let data = "Agency,Avg Time to Answer (s),Year,Month,Calls Answered,Total Incoming Calls,Calls Answered Rate,Total Wait Time (min)\n\
                    NYCT,40,2019,Mar,90,100,0.9,12";
        let recs = read_records(data.as_bytes(), RateUnit::Fraction).unwrap();
        assert_eq!(recs[0].avg_time_to_answer_s, 40.0);
        assert_eq!(recs[0].month.ordinal, Some(3));
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let data = "Year,Month,Calls Answered\n2021,Jan,5";
        match read_records(data.as_bytes(), RateUnit::Fraction) {
            Err(DashboardError::MissingColumns(cols)) => {
                assert_eq!(
                    cols,
                    vec![
                        "Total Incoming Calls",
                        "Calls Answered Rate",
                        "Total Wait Time (min)",
                        "Avg Time to Answer (s)"
                    ]
                );
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn malformed_cell_is_a_hard_failure() {
        let data = csv_with(&["2021,Jan,100,90,0.9,10,20", "2021,Feb,lots,90,0.9,10,20"]);
        match read_records(data.as_bytes(), RateUnit::Fraction) {
            Err(DashboardError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_TOTAL_CALLS);
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn distinct_years_keep_first_appearance_order() {
        let data = csv_with(&[
            "2022,Jan,1,1,1,1,1",
            "2021,Jan,1,1,1,1,1",
            "2022,Feb,1,1,1,1,1",
        ]);
        let recs = read_records(data.as_bytes(), RateUnit::Fraction).unwrap();
        assert_eq!(distinct_years(&recs), vec![2022, 2021]);
    }

    #[test]
    fn fixed_source_reads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{}", csv_with(&["2020,Jan,10,9,0.9,1,2"])).unwrap();
        let src = DataSource::Fixed(f.path().to_path_buf());
        let (recs, report) = load_dataset(&src, RateUnit::Fraction).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.years, vec![2020]);
    }

    #[test]
    fn missing_fixed_file_is_io_error() {
        let src = DataSource::Fixed(PathBuf::from("/definitely/not/here.csv"));
        assert!(matches!(load_dataset(&src, RateUnit::Fraction), Err(DashboardError::Io { .. })));
    }

    #[test]
    fn uploads_must_be_csv() {
        assert!(DataSource::check_upload_name("calls.CSV").is_ok());
        assert!(matches!(
            DataSource::check_upload_name("calls.xlsx"),
            Err(DashboardError::UnsupportedUpload(_))
        ));
    }

    #[test]
    fn upload_is_parsed_from_memory() {
        let src = DataSource::Upload {
            file_name: "mine.csv".into(),
            bytes: csv_with(&["2023,Dec,10,5,0.5,1,2"]).into_bytes(),
        };
        assert!(src.is_upload());
        let (recs, report) = load_dataset(&src, RateUnit::Fraction).unwrap();
        assert_eq!(recs[0].month.ordinal, Some(12));
        assert_eq!(report.source, "upload 'mine.csv'");
    }

    #[test]
    fn percent_suffix_is_rejected_for_fraction_rates() {
        let data = csv_with(&["2021,Jan,100,87,87.5%,10,20"]);
        match read_records(data.as_bytes(), RateUnit::Fraction) {
            Err(DashboardError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, COL_ANSWER_RATE);
                assert_eq!(value, "87.5%");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn percent_suffix_is_accepted_for_percent_rates() {
        let data = csv_with(&["2021,Jan,100,87,87.5%,10,20"]);
        let recs = read_records(data.as_bytes(), RateUnit::Percent).unwrap();
        assert_eq!(recs[0].calls_answered_rate, 87.5);
    }

    #[test]
    fn counts_beyond_signed_range_are_rejected() {
        let data = csv_with(&["2021,Jan,10000000000000000000,0,0.5,10,20"]);
        assert!(matches!(
            read_records(data.as_bytes(), RateUnit::Fraction),
            Err(DashboardError::InvalidValue { column: COL_TOTAL_CALLS, .. })
        ));
    }
}
