//! Command-line front end for the stock analyst
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//!
//! # One-shot
//! cargo run --bin stock-analyst -- -s RELIANCE.NS -q "Analysis of current valuation"
//!
//! # Interactive
//! cargo run --bin stock-analyst
//! ```

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use stock_analyst::interface::{PROGRESS, SUBTITLE, TITLE};
use stock_analyst::{AnalysisEngine, AnalystConfig, Formatter, FormatterFactory, OutputFormat, Session};

#[derive(Debug, Parser)]
#[command(name = "stock-analyst", version, about = "AI analyst for NSE/BSE stocks")]
struct Args {
    /// NSE/BSE symbol, e.g. RELIANCE.NS or TCS.NS
    #[arg(short, long)]
    symbol: Option<String>,

    /// Question about the stock, e.g. "Analysis of current valuation"
    #[arg(short, long)]
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Override OPENAI_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Override OPENAI_TEMPERATURE
    #[arg(long)]
    temperature: Option<f32>,
}

fn load_config(args: &Args) -> anyhow::Result<AnalystConfig> {
    let mut builder = AnalystConfig::builder().with_env();
    if let Some(model) = &args.model {
        builder = builder.model(model);
    }
    if let Some(temperature) = args.temperature {
        builder = builder.temperature(temperature);
    }
    builder.build().context("invalid configuration")
}

/// Read one trimmed line, `None` on EOF
fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_exit(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit")
}

/// Run one analysis and print its screen; true when a report was shown
async fn analyze(
    session: &mut Session,
    formatter: &dyn Formatter,
    symbol: &str,
    query: &str,
) -> bool {
    eprintln!("{PROGRESS}");
    let screen = session.trigger(symbol, query).await;
    println!("{}\n", formatter.format_screen(&screen));
    screen.is_report()
}

fn print_banner() {
    println!("{TITLE}\n{SUBTITLE}\n");
}

async fn run_interactive(session: &mut Session, formatter: &dyn Formatter) -> anyhow::Result<()> {
    print_banner();
    println!("Type 'exit' to quit.\n");

    loop {
        let Some(symbol) = prompt_line("Enter NSE/BSE Symbol (e.g., RELIANCE.NS, TCS.NS): ")? else {
            break;
        };
        if is_exit(&symbol) {
            break;
        }
        let Some(query) = prompt_line("Your Query (e.g., 'Analysis of current valuation'): ")? else {
            break;
        };
        if is_exit(&query) {
            break;
        }

        analyze(session, formatter, &symbol, &query).await;
    }

    println!("Goodbye!");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    analyst_utils::init_tracing();

    let args = Args::parse();
    let config = load_config(&args)?;
    let engine = AnalysisEngine::from_config(&config).context("failed to initialise analysis engine")?;

    let formatter = FormatterFactory::create(args.format, config.news_display_limit);
    let mut session = Session::new(Arc::new(engine));

    if args.symbol.is_none() && args.query.is_none() {
        run_interactive(&mut session, formatter.as_ref()).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // JSON output stays a single document
    if args.format == OutputFormat::Text {
        print_banner();
    }

    let shown = analyze(
        &mut session,
        formatter.as_ref(),
        args.symbol.as_deref().unwrap_or_default(),
        args.query.as_deref().unwrap_or_default(),
    )
    .await;

    Ok(if shown {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
