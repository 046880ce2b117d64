use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "flower",
    version,
    about = "A tool for using the flowtime time-management method"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a flow session for a task
    #[command(alias = "work")]
    Start {
        /// Task description
        task: String,
    },
    /// End the flow and start a suggested break
    Break,
    /// End the break and start a new session with the same task
    Resume,
    /// Finish the current session
    Stop,
    /// Show what is currently running
    Status,
    /// Show completed sessions, newest first
    #[command(alias = "list")]
    Log {
        /// Page to display
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Entries per page (defaults to the configured page size)
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print the state file path
    Locate,
    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Track work sessions against tasks
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Start { task } => commands::flow::start(&task),
        Commands::Break => commands::flow::take_break(),
        Commands::Resume => commands::flow::resume(),
        Commands::Stop => commands::flow::stop(),
        Commands::Status => commands::flow::status(),
        Commands::Log { page, count } => commands::flow::log(page, count),
        Commands::Locate => commands::flow::locate(),
        Commands::Task { action } => commands::task::run(action),
        Commands::Session { action } => commands::session::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
