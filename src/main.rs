// Entry point and high-level CLI flow.
//
// With `--year` the dashboard is rendered once and the program exits.
// Otherwise an interactive menu drives the session:
// - [1] loads the configured dataset, [2] loads an uploaded CSV,
// - [3] and [4] change the year and prediction horizon,
// - [5] re-renders the full dashboard.
mod charts;
mod config;
mod dashboard;
mod error;
mod insights;
mod loader;
mod metrics;
mod model;
mod output;
mod types;
mod util;

use clap::Parser;
use config::Cli;
use dashboard::{DashboardView, Session};
use error::Result;
use loader::DataSource;
use model::ModelSet;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use types::Horizon;

/// Print `label` and read one trimmed line. `None` on end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn show(view: &DashboardView, export: Option<&std::path::Path>) {
    println!("{}", output::render_dashboard(view));
    if let Some(path) = export {
        match output::export_view(path, view) {
            Ok(()) => println!("(Dashboard exported to {})\n", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
}

/// Load a data source into the session and print a short summary.
fn handle_load(session: &mut Session, source: &DataSource) {
    match session.load(source) {
        Ok(report) => {
            let years: Vec<String> = report.years.iter().map(|y| y.to_string()).collect();
            println!(
                "Processing dataset... ({} rows loaded from {})",
                util::format_int(report.total_rows),
                report.source
            );
            println!("Years available: {}\n", years.join(", "));
        }
        Err(e) => {
            error!(error = %e, "dataset load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_upload(session: &mut Session) {
    let Some(path) = prompt("Path to CSV file: ") else {
        return;
    };
    match DataSource::upload_from_path(path) {
        Ok(source) => handle_load(session, &source),
        Err(e) => eprintln!("Upload rejected: {}\n", e),
    }
}

fn handle_select_year(session: &mut Session) {
    let years: Vec<String> = session
        .available_years()
        .iter()
        .map(|y| y.to_string())
        .collect();
    if years.is_empty() {
        println!("Error: No data loaded. Please load a CSV file first (option 1 or 2).\n");
        return;
    }
    println!("Select Year: {}", years.join(", "));
    let Some(choice) = prompt("Enter year: ") else {
        return;
    };
    match choice.parse::<i32>() {
        Ok(year) => match session.select_year(year) {
            Ok(view) => println!("{}", output::render_dashboard(&view)),
            Err(e) => eprintln!("{}\n", e),
        },
        Err(_) => println!("Invalid year '{}'.\n", choice),
    }
}

fn handle_select_horizon(session: &mut Session) {
    for (i, h) in Horizon::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, h);
    }
    let Some(choice) = prompt("Select Prediction: ") else {
        return;
    };
    let horizon = match choice.as_str() {
        "1" => Horizon::Weekly,
        "2" => Horizon::Monthly,
        "3" => Horizon::Yearly,
        _ => {
            println!("Invalid choice. Please enter 1, 2 or 3.\n");
            return;
        }
    };
    match session.select_horizon(horizon) {
        Ok(prediction) => println!("{}\n", prediction),
        Err(e) => eprintln!("{}\n", e),
    }
}

fn run_interactive(cli: &Cli, session: &mut Session) {
    loop {
        let year = session
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Telesales Dashboard (year: {}, prediction: {}{})",
            year,
            session.horizon(),
            if session.has_upload() { ", uploaded data" } else { "" }
        );
        println!("[1] Load the file");
        println!("[2] Upload a CSV file");
        println!("[3] Select year");
        println!("[4] Select prediction");
        println!("[5] Show dashboard");
        println!("[0] Exit\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(session, &DataSource::Fixed(cli.data.clone())),
            "2" => handle_upload(session),
            "3" => handle_select_year(session),
            "4" => handle_select_horizon(session),
            "5" => match session.view() {
                Ok(view) => show(&view, cli.export.as_deref()),
                Err(e) => println!("Error: {}\n", e),
            },
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

fn run_once(cli: &Cli, session: &mut Session, year: i32) -> Result<()> {
    let source = match &cli.upload {
        Some(path) => DataSource::upload_from_path(path)?,
        None => DataSource::Fixed(cli.data.clone()),
    };
    session.load(&source)?;
    let view = session.select_year(year)?;
    if view.kpis.ready().is_none() {
        info!(year, "selected year has no KPIs");
    }
    show(&view, cli.export.as_deref());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    config::init_tracing(cli.log_level());

    // Models are required for every view, so a bad artifact stops here.
    let models = match ModelSet::load_dir(&cli.models) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "model load failed");
            eprintln!("Fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new(models, cli.rate_unit).with_horizon(cli.horizon);

    if let Some(year) = cli.year {
        if let Err(e) = run_once(&cli, &mut session, year) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &cli.upload {
        match DataSource::upload_from_path(path) {
            Ok(source) => handle_load(&mut session, &source),
            Err(e) => eprintln!("Upload rejected: {}\n", e),
        }
    } else {
        handle_load(&mut session, &DataSource::Fixed(cli.data.clone()));
    }
    run_interactive(&cli, &mut session);
    ExitCode::SUCCESS
}
