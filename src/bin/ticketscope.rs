use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ticketscope::{Config, ReportOutcome, ReportProgress, ReportStatus, TicketScope};

#[derive(Parser)]
#[command(name = "ticketscope", about = "Per-company support ticket analysis reports")]
struct Cli {
    /// Path to the JSON ticket source
    #[arg(long, default_value = "data.json")]
    input: PathBuf,

    /// Output directory for per-company reports
    #[arg(long, default_value = "summaries")]
    output: PathBuf,

    /// Trailing trend window in days
    #[arg(long, default_value = "180")]
    window_days: u32,

    /// Reference timestamp for the trend window ("YYYY-MM-DD HH:MM" or "YYYY-MM-DD");
    /// defaults to the wall clock
    #[arg(long)]
    now: Option<String>,

    /// LLM provider: bedrock or anthropic
    #[arg(long, default_value = "bedrock")]
    provider: String,

    /// LLM model name
    #[arg(long, default_value = "claude-sonnet-4-5")]
    model: String,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Progress reporter that writes to stderr.
struct StderrProgress;

impl ReportProgress for StderrProgress {
    fn on_company_start(&self, company: &str, index: usize, total: usize) {
        eprintln!("[{}/{}] Analyzing {}...", index + 1, total, company);
    }

    fn on_batch_complete(&self, _company: &str, batch: usize, total: usize) {
        eprintln!("  Batch {batch}/{total} done");
    }

    fn on_company_complete(&self, outcome: &ReportOutcome) {
        eprintln!(
            "  Done: {}/{} batches",
            outcome.batches_completed, outcome.batches_total
        );
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List companies with ticket counts
    Companies,
    /// Print per-company statistics (no LLM calls)
    Stats {
        /// Restrict to one company
        company: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the full analysis report
    Report {
        /// Restrict to one company (default: all companies)
        company: Option<String>,
        /// Tickets per prompt batch
        #[arg(long, default_value = "50")]
        batch_size: usize,
        /// Also render the report to HTML
        #[arg(long)]
        html: bool,
    },
    /// Generate the deep root-cause analysis report
    Causes {
        /// Restrict to one company (default: all companies)
        company: Option<String>,
        /// Also render the report to HTML
        #[arg(long)]
        html: bool,
    },
    /// Run the seven standalone analysis methods for one company
    Methods {
        /// Company to analyze
        company: String,
    },
    /// Render a saved summary JSON or report text file to HTML
    Render {
        /// Input file (summary.json or a markdown report)
        input: PathBuf,
        /// Output path (default: input with .html extension)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let now = match &cli.now {
        Some(s) => Some(ticketscope::config::parse_now(s)?),
        None => None,
    };
    let config = Config {
        source: cli.input.clone(),
        output_dir: cli.output.clone(),
        window_days: cli.window_days,
        now,
        llm_provider: cli.provider.clone(),
        llm_model: cli.model.clone(),
        ..Config::default()
    };

    match cli.command {
        Commands::Companies => {
            let scope = TicketScope::load(config)?;
            for group in scope.companies() {
                println!("{} ({} tickets)", group.company, group.tickets.len());
            }
        }
        Commands::Stats { company, json } => {
            let scope = TicketScope::load(config)?;
            handle_stats(&scope, company.as_deref(), json)?;
        }
        Commands::Report {
            company,
            batch_size,
            html,
        } => {
            let config = Config { batch_size, ..config };
            let scope = TicketScope::load(config)?;
            let agent = ticketscope::llm::create_agent(scope.config()).await?;
            let progress = StderrProgress;

            let outcomes = match company {
                Some(name) => {
                    let group = scope.company(&name)?;
                    progress.on_company_start(&name, 0, 1);
                    let outcome = scope.report_company(&agent, &group, &progress).await;
                    progress.on_company_complete(&outcome);
                    vec![outcome]
                }
                None => scope.report_all(&agent, &progress).await,
            };
            finish(&scope, &outcomes, html)?;
        }
        Commands::Causes { company, html } => {
            let scope = TicketScope::load(config)?;
            let agent = ticketscope::llm::create_agent(scope.config()).await?;

            let outcomes = match company {
                Some(name) => {
                    let group = scope.company(&name)?;
                    vec![scope.causes_company(&agent, &group).await]
                }
                None => {
                    let groups = scope.companies();
                    let mut outcomes = Vec::with_capacity(groups.len());
                    for group in &groups {
                        outcomes.push(scope.causes_company(&agent, group).await);
                    }
                    outcomes
                }
            };
            finish(&scope, &outcomes, html)?;
        }
        Commands::Methods { company } => {
            let scope = TicketScope::load(config)?;
            let agent = ticketscope::llm::create_agent(scope.config()).await?;
            let group = scope.company(&company)?;
            let outcome = scope
                .method_analyses(&agent, &group, &StderrProgress)
                .await;
            print_outcome(&outcome);
            if outcome.status == ReportStatus::Failed {
                anyhow::bail!("all method analyses failed for {company}");
            }
        }
        Commands::Render { input, out } => {
            handle_render(&input, out)?;
        }
    }

    Ok(())
}

fn handle_stats(scope: &TicketScope, company: Option<&str>, json: bool) -> anyhow::Result<()> {
    let summaries = match company {
        Some(name) => {
            let group = scope.company(name)?;
            vec![scope.summarize(&group)]
        }
        None => scope.summaries(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", summary.company);
        println!("  Tickets:        {}", summary.total_count);
        println!("  Empty or short: {}", summary.empty_or_short_count);
        println!("  Top themes:     {}", summary.top_themes_line());
        println!("  Top projects:   {}", summary.top_projects_line());
        println!("  Monthly trend:  {}", summary.monthly_trend_line());
        println!("  Weekly trend:   {}", summary.weekly_trend_line());
        println!("  By weekday:     {}", summary.daily_trend_line());
        println!();
    }
    Ok(())
}

fn finish(scope: &TicketScope, outcomes: &[ReportOutcome], html: bool) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for outcome in outcomes {
        print_outcome(outcome);
        if outcome.status == ReportStatus::Failed {
            failed += 1;
            continue;
        }
        if html {
            if let Some(path) = &outcome.output_path {
                let text = std::fs::read_to_string(path)?;
                let name = path
                    .file_stem()
                    .map(|s| format!("{}.html", s.to_string_lossy()))
                    .unwrap_or_else(|| "report.html".to_string());
                let out = ticketscope::report::write_html_report(
                    &scope.config().output_dir,
                    &outcome.company,
                    &name,
                    &text,
                )?;
                println!("  HTML: {}", out.display());
            }
        }
    }
    if failed == outcomes.len() && !outcomes.is_empty() {
        anyhow::bail!("report generation failed for every company");
    }
    Ok(())
}

fn print_outcome(outcome: &ReportOutcome) {
    println!("Report: {}", outcome.company);
    println!("  Status:  {:?}", outcome.status);
    println!(
        "  Batches: {}/{}",
        outcome.batches_completed, outcome.batches_total
    );
    if let Some(path) = &outcome.output_path {
        println!("  Output:  {}", path.display());
    }
    if let Some(err) = &outcome.error {
        println!("  Error:   {err}");
    }
}

fn handle_render(input: &PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)?;

    // summary.json files wrap the text; markdown files are used as-is.
    let (title, text) = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => {
            let company = value["company"].as_str().unwrap_or("report").to_string();
            let summary = value["summary"].as_str().unwrap_or_default().to_string();
            (format!("Ticket Analysis Report - {company}"), summary)
        }
        Err(_) => ("Ticket Analysis Report".to_string(), raw),
    };

    let out = out.unwrap_or_else(|| input.with_extension("html"));
    std::fs::write(&out, ticketscope::report::render_html(&title, &text))?;
    println!("Rendered: {}", out.display());
    Ok(())
}
