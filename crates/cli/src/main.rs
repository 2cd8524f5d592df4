use anyhow::Context;
use clap::{Parser, Subcommand};
use costdash_core::chart::ChartAdapter;
use costdash_core::client::HttpCostApi;
use costdash_core::dashboard::{Dashboard, Phase};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod terminal_chart;
mod view;

use terminal_chart::TerminalChart;

#[derive(Debug, Parser)]
#[command(name = "costdash")]
struct Args {
    /// Backend base URL. Overrides COSTDASH_API_BASE_URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load costs and analysis together and print the dashboard (default).
    Dashboard {
        /// Width of the longest bar in the cost chart.
        #[arg(long, default_value_t = 40)]
        chart_width: usize,
    },
    /// Most recent cost records.
    Latest,
    /// Cost totals per meter category.
    Summary,
    /// Cost records for a single resource.
    Resource { resource_id: String },
    /// Cost records between two dates (YYYY-MM-DD, inclusive).
    Range {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings =
        costdash_core::config::Settings::from_env()?.with_api_base_url(args.api_base_url.clone());
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let api = HttpCostApi::from_settings(&settings)?;
    tracing::debug!(base_url = %api.base_url(), "cost API configured");

    let command = args.command.unwrap_or(Command::Dashboard { chart_width: 40 });
    let result = run(command, api).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(command: Command, api: HttpCostApi) -> anyhow::Result<ExitCode> {
    match command {
        Command::Dashboard { chart_width } => return run_dashboard(api, chart_width).await,
        Command::Latest => print_records(api.fetch_latest_costs().await)?,
        Command::Summary => {
            let totals = api
                .fetch_category_summary()
                .await
                .context("failed to fetch cost summary")?;
            println!("{}", view::render_category_summary(&totals));
        }
        Command::Resource { resource_id } => {
            print_records(api.fetch_costs_for_resource(&resource_id).await)?
        }
        Command::Range { start, end } => {
            let (start, end) = parse_range(&start, &end)?;
            print_records(api.fetch_costs_between(&start, &end).await)?
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_dashboard(api: HttpCostApi, chart_width: usize) -> anyhow::Result<ExitCode> {
    let dashboard = Dashboard::new(api);
    let mut chart = ChartAdapter::new(TerminalChart::new(chart_width));

    println!("{}", view::render_state(&dashboard.snapshot(), None));

    let report = dashboard.load().await?;
    let state = dashboard.snapshot();

    if state.phase == Phase::Loaded {
        chart.sync(&state.costs)?;
    }
    println!("{}", view::render_state(&state, chart.instance()));

    let code = if state.phase == Phase::Failed {
        if let Some(notice) = view::render_degraded(&report) {
            println!("{notice}");
        }
        for err in report.errors() {
            tracing::error!(kind = err.kind(), error = %err, "dashboard fetch failed");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };

    dashboard.close();
    chart.dispose();
    Ok(code)
}

fn print_records(
    result: Result<Vec<costdash_core::domain::cost::CostRecord>, costdash_core::client::ApiError>,
) -> anyhow::Result<()> {
    let records = result.context("failed to fetch cost records")?;
    println!("{}", view::render_table(&records));
    Ok(())
}

fn parse_range(start: &str, end: &str) -> anyhow::Result<(String, String)> {
    let start_date = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date: {start}"))?;
    let end_date = chrono::NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .with_context(|| format!("invalid --end date: {end}"))?;
    anyhow::ensure!(
        start_date <= end_date,
        "--start ({start_date}) must not be after --end ({end_date})"
    );
    Ok((start_date.to_string(), end_date.to_string()))
}

fn init_sentry(settings: &costdash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
