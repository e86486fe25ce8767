//! Chart specifications derived from a filtered view.
//!
//! These are plain data: the console renderer prints them as tables and the
//! JSON export hands them to an external plotting front end.
use crate::error::{DashboardError, Result};
use crate::types::{CallRecord, Kpis, COL_ANSWERED, COL_ANSWER_RATE, COL_TOTAL_CALLS};
use serde::Serialize;

pub const ANSWERED_COLOR: &str = "#2ECC71";
pub const UNANSWERED_COLOR: &str = "#E74C3C";

// Endpoints of the continuous scale used for the answer-rate bars.
const SCALE_LOW: (u8, u8, u8) = (0x0D, 0x08, 0x87);
const SCALE_HIGH: (u8, u8, u8) = (0xF0, 0xF9, 0x21);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub x: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

/// Total incoming vs answered calls per month.
pub fn trend_chart(view: &[CallRecord]) -> LineChart {
    LineChart {
        title: "Total Calls vs Answered Calls".to_string(),
        x: view.iter().map(|r| r.month.label.clone()).collect(),
        series: vec![
            Series {
                name: COL_TOTAL_CALLS.to_string(),
                values: view.iter().map(|r| r.total_incoming_calls as f64).collect(),
            },
            Series {
                name: COL_ANSWERED.to_string(),
                values: view.iter().map(|r| r.calls_answered as f64).collect(),
            },
        ],
    }
}

/// Answered vs unanswered share; needs percentages, so a year without any
/// incoming calls has nothing to draw.
pub fn breakdown_chart(kpis: &Kpis) -> Result<PieChart> {
    let (Some(answered), Some(unanswered)) = (kpis.answered_percentage, kpis.unanswered_percentage)
    else {
        return Err(DashboardError::NoData { year: kpis.year });
    };
    Ok(PieChart {
        title: "Answered vs Unanswered Calls".to_string(),
        slices: vec![
            PieSlice {
                name: "Answered Calls".to_string(),
                value: answered,
                color: ANSWERED_COLOR.to_string(),
            },
            PieSlice {
                name: "Unanswered Calls".to_string(),
                value: unanswered,
                color: UNANSWERED_COLOR.to_string(),
            },
        ],
    })
}

/// `Calls Answered Rate` per month, each bar colored by its value.
pub fn answer_rate_chart(view: &[CallRecord]) -> BarChart {
    let (min, max) = view
        .iter()
        .map(|r| r.calls_answered_rate)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    BarChart {
        title: "Monthly Answer Rate".to_string(),
        y_label: COL_ANSWER_RATE.to_string(),
        bars: view
            .iter()
            .map(|r| Bar {
                x: r.month.label.clone(),
                value: r.calls_answered_rate,
                color: scale_color(r.calls_answered_rate, min, max),
            })
            .collect(),
    }
}

/// Linear interpolation between the scale endpoints. A flat range maps to
/// the low end.
pub fn scale_color(value: f64, min: f64, max: f64) -> String {
    let range = max - min;
    let t = if !range.is_finite() || range.abs() < f64::EPSILON {
        0.0
    } else {
        ((value - min) / range).clamp(0.0, 1.0)
    };
    let lerp = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
    format!(
        "#{:02X}{:02X}{:02X}",
        lerp(SCALE_LOW.0, SCALE_HIGH.0),
        lerp(SCALE_LOW.1, SCALE_HIGH.1),
        lerp(SCALE_LOW.2, SCALE_HIGH.2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_kpis;
    use crate::metrics::tests::record;
    use crate::types::RateUnit;

    #[test]
    fn trend_follows_row_order() {
        let view = vec![record(2021, "Mar", 30, 20), record(2021, "Jan", 10, 5)];
        let chart = trend_chart(&view);
        assert_eq!(chart.x, vec!["Mar", "Jan"]);
        assert_eq!(chart.series[0].name, "Total Incoming Calls");
        assert_eq!(chart.series[0].values, vec![30.0, 10.0]);
        assert_eq!(chart.series[1].values, vec![20.0, 5.0]);
    }

    #[test]
    fn pie_uses_kpi_percentages_and_fixed_colors() {
        let view = vec![record(2021, "Jan", 1000, 800)];
        let kpis = compute_kpis(&view, 2021, RateUnit::Fraction).unwrap();
        let pie = breakdown_chart(&kpis).unwrap();
        assert_eq!(pie.slices[0].value, 80.0);
        assert_eq!(pie.slices[0].color, ANSWERED_COLOR);
        assert_eq!(pie.slices[1].value, 20.0);
        assert_eq!(pie.slices[1].color, UNANSWERED_COLOR);
    }

    #[test]
    fn pie_without_calls_is_no_data() {
        let view = vec![record(2021, "Jan", 0, 0)];
        let kpis = compute_kpis(&view, 2021, RateUnit::Fraction).unwrap();
        assert!(breakdown_chart(&kpis).unwrap_err().is_no_data());
    }

    #[test]
    fn bars_span_the_color_scale() {
        let view = vec![
            record(2021, "Jan", 100, 50),
            record(2021, "Feb", 100, 100),
            record(2021, "Mar", 100, 75),
        ];
        let chart = answer_rate_chart(&view);
        assert_eq!(chart.bars[0].color, "#0D0887");
        assert_eq!(chart.bars[1].color, "#F0F921");
        assert_ne!(chart.bars[2].color, chart.bars[0].color);
        assert_eq!(chart.bars[2].value, 0.75);
    }

    #[test]
    fn flat_range_maps_to_low_end() {
        assert_eq!(scale_color(5.0, 5.0, 5.0), "#0D0887");
        assert!(answer_rate_chart(&[]).bars.is_empty());
    }
}
