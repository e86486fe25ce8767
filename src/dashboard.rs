//! Session context and the handlers behind each dashboard control.
//!
//! Every control (load, upload, year, horizon) is a method on `Session`
//! that updates the selection and returns a freshly derived view. Nothing
//! is cached between interactions apart from the loaded dataset.
use crate::charts::{answer_rate_chart, breakdown_chart, trend_chart, BarChart, LineChart, PieChart};
use crate::error::{DashboardError, Result};
use crate::insights::{answer_rate_insight, response_time_insight, Insight};
use crate::loader::{load_dataset, DataSource, LoadReport};
use crate::metrics::{compute_kpis, filter_by_year};
use crate::model::{predict, ModelSet, Prediction};
use crate::types::{CallRecord, Horizon, Kpis, RateUnit};
use serde::Serialize;
use tracing::{debug, warn};

pub const DASHBOARD_TITLE: &str = "Telesales Performance Dashboard";

/// A dashboard section that either rendered or carries the reason it could not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(v) => Some(v),
            Panel::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T>> for Panel<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(v) => Panel::Ready(v),
            Err(e) => {
                if !e.is_no_data() {
                    warn!(error = %e, "dashboard panel failed");
                }
                Panel::Unavailable(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub source: String,
    pub year: i32,
    pub available_years: Vec<i32>,
    pub rows: Vec<CallRecord>,
    pub kpis: Panel<Kpis>,
    pub trend: LineChart,
    pub breakdown: Panel<PieChart>,
    pub prediction: Panel<Prediction>,
    pub answer_rate: BarChart,
    pub response_time_insight: Panel<Insight>,
    pub answer_rate_insight: Panel<Insight>,
}

/// Derive every section for one year and horizon. Sections are independent:
/// one failing never hides the others.
pub fn build_view(
    data: &[CallRecord],
    report: &LoadReport,
    year: i32,
    horizon: Horizon,
    models: &ModelSet,
    unit: RateUnit,
) -> DashboardView {
    let view = filter_by_year(data, year);
    debug!(year, rows = view.len(), "filtered view");

    let kpis = compute_kpis(&view, year, unit);
    let breakdown = match &kpis {
        Ok(k) => breakdown_chart(k),
        Err(_) => Err(DashboardError::NoData { year }),
    };

    DashboardView {
        title: DASHBOARD_TITLE,
        source: report.source.clone(),
        year,
        available_years: report.years.clone(),
        trend: trend_chart(&view),
        answer_rate: answer_rate_chart(&view),
        breakdown: breakdown.into(),
        prediction: predict(models, horizon, &view, year).into(),
        response_time_insight: response_time_insight(&view, year).into(),
        answer_rate_insight: answer_rate_insight(&view, year, unit).into(),
        kpis: kpis.into(),
        rows: view,
    }
}

struct LoadedDataset {
    records: Vec<CallRecord>,
    report: LoadReport,
    from_upload: bool,
}

/// Everything one user's dashboard needs: the read-only models, the current
/// dataset and the current selections.
pub struct Session {
    models: ModelSet,
    rate_unit: RateUnit,
    dataset: Option<LoadedDataset>,
    year: Option<i32>,
    horizon: Horizon,
}

impl Session {
    pub fn new(models: ModelSet, rate_unit: RateUnit) -> Self {
        Self {
            models,
            rate_unit,
            dataset: None,
            year: None,
            horizon: Horizon::Weekly,
        }
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Replace the dataset. The year selection resets to the first year in
    /// the new data.
    pub fn load(&mut self, source: &DataSource) -> Result<&LoadReport> {
        let (records, report) = load_dataset(source, self.rate_unit)?;
        self.year = report.years.first().copied();
        let dataset = self.dataset.insert(LoadedDataset {
            records,
            report,
            from_upload: source.is_upload(),
        });
        Ok(&dataset.report)
    }

    pub fn has_upload(&self) -> bool {
        self.dataset.as_ref().is_some_and(|d| d.from_upload)
    }

    pub fn available_years(&self) -> &[i32] {
        self.dataset
            .as_ref()
            .map(|d| d.report.years.as_slice())
            .unwrap_or(&[])
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Year selector. Any year is accepted; one without rows renders as
    /// "no data".
    pub fn select_year(&mut self, year: i32) -> Result<DashboardView> {
        if self.dataset.is_none() {
            return Err(DashboardError::NoDataset);
        }
        self.year = Some(year);
        self.view()
    }

    /// Horizon selector; only the prediction depends on it.
    pub fn select_horizon(&mut self, horizon: Horizon) -> Result<Prediction> {
        self.horizon = horizon;
        let dataset = self.dataset.as_ref().ok_or(DashboardError::NoDataset)?;
        let year = self.year.ok_or(DashboardError::NoDataset)?;
        let view = filter_by_year(&dataset.records, year);
        predict(&self.models, horizon, &view, year)
    }

    pub fn view(&self) -> Result<DashboardView> {
        let dataset = self.dataset.as_ref().ok_or(DashboardError::NoDataset)?;
        let year = self.year.ok_or(DashboardError::NoDataset)?;
        Ok(build_view(
            &dataset.records,
            &dataset.report,
            year,
            self.horizon,
            &self.models,
            self.rate_unit,
        ))
    }
}
