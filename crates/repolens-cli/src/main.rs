mod cmd_analyze;
mod cmd_config;
mod cmd_recent;
mod cmd_report;
mod cmd_status;
mod cmd_watch;
mod context;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "repolens",
    version,
    about = "Submit GitHub repositories for analysis and read the reports"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// API base URL (overrides config and REPOLENS_API_BASE_URL)
    #[arg(long, global = true)]
    api: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Args, Default)]
pub struct PollArgs {
    /// Seconds between status checks
    #[arg(long)]
    interval: Option<u64>,
    /// Status checks before giving up
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a repository, wait for the analysis, and show the report
    Analyze {
        /// Repository URL (https://github.com/<owner>/<repo>)
        url: String,
        /// GitHub access token for private repositories
        #[arg(long)]
        token: Option<String>,
        /// Print the job id and return without waiting
        #[arg(long)]
        no_wait: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Show the current status of a job
    Status {
        /// Job id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow an existing job until it finishes, then show the report
    Watch {
        /// Job id
        id: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Show the report for a completed job
    Report {
        /// Job id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recently submitted jobs
    Recent {
        /// Fetch live status for each job
        #[arg(long)]
        refresh: bool,
        /// Forget all recent jobs
        #[arg(long, conflicts_with = "refresh")]
        clear: bool,
    },
    /// Manage client settings
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let api = cli.api.as_deref();

    match cli.cmd {
        Command::Analyze {
            url,
            token,
            no_wait,
            json,
            poll,
        } => cmd_analyze::execute(cmd_analyze::AnalyzeParams {
            api,
            url: &url,
            token: token.as_deref(),
            no_wait,
            json,
            poll: &poll,
        }),
        Command::Status { id, json } => cmd_status::execute(api, &id, json),
        Command::Watch { id, json, poll } => cmd_watch::execute(api, &id, json, &poll),
        Command::Report { id, json } => cmd_report::execute(api, &id, json),
        Command::Recent { refresh, clear } => cmd_recent::execute(api, refresh, clear),
        Command::Config { cmd } => cmd_config::run(cmd, api),
    }
}
