use crate::demo::{run_demo, run_report, DemoArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sigma::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SIGMA",
    about = "Nutrition surveillance dashboard engine: serve the analytics API or print reports",
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
    /// Build a dashboard report from reference and monthly report CSV exports
    Report(ReportArgs),
    /// Print a dashboard report for a synthetic district
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
