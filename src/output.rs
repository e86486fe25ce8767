use crate::dashboard::{DashboardView, Panel};
use crate::error::{DashboardError, Result};
use crate::insights::Insight;
use crate::types::{KpiRow, Kpis, MonthRow};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| DashboardError::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| DashboardError::io(path, e))?;
    Ok(())
}

/// `.csv` paths get the per-month table; anything else the whole view as JSON.
pub fn export_view(path: &Path, view: &DashboardView) -> Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        write_csv(path, &month_rows(view))
    } else {
        write_json(path, view)
    }
}

fn markdown_table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn kpi_rows(kpis: &Kpis) -> Vec<KpiRow> {
    let pct = |p: Option<f64>| match p {
        Some(v) => format!("{}%", format_number(v, 2)),
        None => "n/a".to_string(),
    };
    vec![
        KpiRow {
            metric: "Total Calls".into(),
            value: format_int(kpis.total_calls),
        },
        KpiRow {
            metric: "Answered Calls".into(),
            value: format_int(kpis.answered_calls),
        },
        KpiRow {
            metric: "Answer Rate".into(),
            value: format!("{}%", format_number(kpis.answer_rate_pct, 2)),
        },
        KpiRow {
            metric: "Unanswered Calls".into(),
            value: format_int(kpis.unanswered_calls),
        },
        KpiRow {
            metric: "Answered %".into(),
            value: pct(kpis.answered_percentage),
        },
        KpiRow {
            metric: "Unanswered %".into(),
            value: pct(kpis.unanswered_percentage),
        },
    ]
}

/// Line and bar chart data side by side, one row per month.
pub fn month_rows(view: &DashboardView) -> Vec<MonthRow> {
    view.rows
        .iter()
        .zip(view.answer_rate.bars.iter())
        .map(|(r, bar)| MonthRow {
            month: r.month.label.clone(),
            total_incoming_calls: format_int(r.total_incoming_calls),
            calls_answered: format_int(r.calls_answered),
            calls_answered_rate: format_number(r.calls_answered_rate, 4),
            color: bar.color.clone(),
        })
        .collect()
}

fn insight_line(panel: &Panel<Insight>) -> String {
    match panel {
        Panel::Ready(i) if i.is_warning() => format!("[WARN] {}", i.message),
        Panel::Ready(i) => format!("[OK]   {}", i.message),
        Panel::Unavailable(reason) => format!("[--]   {}", reason),
    }
}

/// Render the whole dashboard as console text.
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "Source: {}", view.source);
    let years: Vec<String> = view.available_years.iter().map(|y| y.to_string()).collect();
    let _ = writeln!(out, "Years: {}\n", years.join(", "));

    let _ = writeln!(out, "Performance Metrics for Year {}\n", view.year);
    match &view.kpis {
        Panel::Ready(k) => {
            let _ = writeln!(out, "{}\n", markdown_table(kpi_rows(k)));
        }
        Panel::Unavailable(reason) => {
            let _ = writeln!(out, "{}\n", reason);
        }
    }

    let _ = writeln!(out, "Call Answering Trend ({})", view.trend.title);
    let _ = writeln!(out, "Performance Analysis ({})\n", view.answer_rate.title);
    let _ = writeln!(out, "{}\n", markdown_table(month_rows(view)));

    let _ = writeln!(out, "Answered vs Unanswered Calls");
    match &view.breakdown {
        Panel::Ready(pie) => {
            for s in &pie.slices {
                let _ = writeln!(out, "  {:<17} {:>7}%", s.name, format_number(s.value, 2));
            }
        }
        Panel::Unavailable(reason) => {
            let _ = writeln!(out, "  {}", reason);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Predict Future Performance");
    match &view.prediction {
        Panel::Ready(p) => {
            let _ = writeln!(out, "  {}", p);
        }
        Panel::Unavailable(reason) => {
            let _ = writeln!(out, "  {}", reason);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Insights");
    let _ = writeln!(out, "  {}", insight_line(&view.response_time_insight));
    let _ = writeln!(out, "  {}", insight_line(&view.answer_rate_insight));
    out
}
