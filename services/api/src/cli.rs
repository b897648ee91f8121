use crate::demo::{print_properties, run_demo, DemoArgs, PropertiesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use uw_triage::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Underwriting Triage",
    about = "Run the underwriting triage service or explore it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the merged six-property dataset as JSON
    Properties(PropertiesArgs),
    /// Run create, process, results, and leaderboard against an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override DATABASE_URL
    #[arg(long)]
    pub(crate) database_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Properties(args) => print_properties(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
