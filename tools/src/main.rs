//! desk-runner: headless driver for the credit application desk.
//!
//! Usage:
//!   desk-runner --seed 12345 --perturb 100 --export credit_scores.csv
//!   desk-runner --seed 12345 --live-secs 30
//!   desk-runner --seed 12345 --ipc-mode

use anyhow::Result;
use credit_desk_core::{
    analytics::{AnalyticsSummary, DashboardOverview},
    command::DeskCommand,
    config::DeskConfig,
    export,
    feed::LiveFeed,
    filter::FilterCriteria,
    record::ApplicationRecord,
    Desk,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Export,
    Command {
        command: DeskCommand,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    session_id: &'a str,
    revision: u64,
    generation: u64,
    has_active_filters: bool,
    criteria: &'a FilterCriteria,
    overview: DashboardOverview,
    summary: &'a AnalyticsSummary,
    filtered: &'a [ApplicationRecord],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let perturb = parse_arg(&args, "--perturb", 0u64);
    let live_secs = parse_arg(&args, "--live-secs", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str());
    let export_path = args
        .windows(2)
        .find(|w| w[0] == "--export")
        .map(|w| w[1].as_str());

    let config = match data_dir {
        Some(dir) => DeskConfig::load(dir)?,
        None => DeskConfig::default(),
    };

    let session_id = uuid::Uuid::new_v4().to_string();

    if !ipc_mode {
        println!("Credit Desk: desk-runner");
        println!("  session:    {session_id}");
        println!("  seed:       {seed}");
        println!("  perturb:    {perturb}");
        println!("  live secs:  {live_secs}");
        println!("  data_dir:   {}", data_dir.unwrap_or("(built-in defaults)"));
        println!();
    }

    let desk = Arc::new(Desk::new(config, seed)?);
    let runtime = tokio::runtime::Runtime::new()?;

    if ipc_mode {
        // The feed runs on the runtime's workers while this thread reads stdin.
        let feed = {
            let _guard = runtime.enter();
            LiveFeed::spawn(Arc::clone(&desk))
        };
        let outcome = run_ipc_loop(&desk, &session_id);
        runtime.block_on(feed.stop())?;
        outcome?;
    } else {
        for _ in 0..perturb {
            desk.perturb_one();
        }
        if live_secs > 0 {
            runtime.block_on(async {
                let feed = LiveFeed::spawn(Arc::clone(&desk));
                tokio::time::sleep(Duration::from_secs(live_secs)).await;
                feed.stop().await
            })?;
        }
        print_summary(&desk, &session_id);
        if let Some(path) = export_path {
            std::fs::write(path, export::to_csv(&desk.filtered_records()))?;
            println!("  exported:       {path}");
        }
    }

    Ok(())
}

fn run_ipc_loop(desk: &Desk, session_id: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => write_state(&mut stdout, desk, session_id)?,
            IpcRequest::Export => {
                let csv = export::to_csv(&desk.filtered_records());
                writeln!(stdout, "{}", serde_json::json!({ "csv": csv }))?;
            }
            IpcRequest::Command { command } => {
                match desk.apply_command(command) {
                    Ok(()) => write_state(&mut stdout, desk, session_id)?,
                    Err(e) => {
                        log::warn!("ipc: command rejected: {e}");
                        write_error(&mut stdout, &e.to_string())?;
                    }
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_state(out: &mut impl Write, desk: &Desk, session_id: &str) -> Result<()> {
    // One read so the subset, summary, and criteria come from the same commit.
    let view = desk.view();
    let state = UiState {
        session_id,
        revision: view.revision,
        generation: desk.generation(),
        has_active_filters: view.criteria != desk.default_criteria(),
        criteria: &view.criteria,
        overview: desk.overview(),
        summary: &view.summary,
        filtered: &view.subset,
    };
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    writeln!(out, "{}", serde_json::json!({ "error": message }))?;
    out.flush()?;
    Ok(())
}

fn print_summary(desk: &Desk, session_id: &str) {
    let overview = desk.overview();
    let stale = desk.records().iter().filter(|r| r.risk_is_stale()).count();

    println!("=== DESK SUMMARY ===");
    println!("  session:        {session_id}");
    println!("  revision:       {}", desk.revision());
    println!("  applications:   {}", overview.total_applications);
    println!("  approved:       {}", overview.approved);
    println!("  pending:        {}", overview.pending);
    println!("  under review:   {}", overview.under_review);
    println!("  rejected:       {}", overview.rejected);
    println!("  high risk:      {}", overview.high_risk);
    println!("  avg score:      {}", overview.avg_score);
    println!("  loan book:      ${:.1}M", overview.total_loan_amount as f64 / 1_000_000.0);
    println!("  approval rate:  {}%", overview.approval_rate);
    println!("  stale risk:     {stale}");

    println!();
    println!("=== SCORE BANDS (filtered) ===");
    match &*desk.summary() {
        AnalyticsSummary::NoData => println!("  (No data available for analysis)"),
        AnalyticsSummary::Report(report) => {
            for (band, count) in &report.score_ranges {
                println!("  {:<18} {count}", band.label());
            }
            println!();
            println!("=== MONTHLY TREND (simulated) ===");
            for p in &report.monthly_trend {
                println!(
                    "  {} | apps: {} | avg score: {} | approval: {}%",
                    p.month, p.applications, p.avg_score, p.approval_rate
                );
            }
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
