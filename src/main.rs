use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};

use tk::config::Config;
use tk::lock::FileLock;
use tk::{logging, mcp, parser, reminder, Session, Storage};

#[derive(Parser)]
#[command(name = "tk", about = "Minimal command-driven task tracker")]
struct Cli {
    /// Task file to use instead of the configured one
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the config file and create an empty task file
    Init,

    /// Run a single command: tk run <command...>
    Run {
        /// Command line, e.g. `deadline submit report /by 2024-01-31`
        line: Vec<String>,
    },

    /// Start MCP server (stdio transport)
    Mcp,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("failed to load config")?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    if let Err(e) = logging::init_logging(&config.log_level, &Config::log_dir()) {
        eprintln!("warning: {}", e);
    }

    match cli.command {
        None => cmd_console(&config),
        Some(Commands::Init) => cmd_init(&config),
        Some(Commands::Run { line }) => cmd_run(&config, &line.join(" ")),
        Some(Commands::Mcp) => mcp::run_mcp_server(config).context("MCP server stopped"),
    }
}

fn cmd_init(config: &Config) -> anyhow::Result<()> {
    config.save().context("failed to write config")?;
    let storage = Storage::new(config.resolved_data_path());
    let tasks = storage.load().context("failed to open task file")?;
    println!("initialized at {}", Config::base_dir().display());
    println!("task file: {} ({} tasks)", storage.path().display(), tasks.len());
    Ok(())
}

fn cmd_run(config: &Config, line: &str) -> anyhow::Result<()> {
    let _lock = FileLock::acquire(&config.lock_path())?;
    let mut session = Session::open(Storage::new(config.resolved_data_path()));
    if let Some(warning) = session.take_warning() {
        eprintln!("warning: {}", warning);
    }
    println!("{}", session.execute(line));
    Ok(())
}

fn cmd_console(config: &Config) -> anyhow::Result<()> {
    let _lock = FileLock::try_acquire(&config.lock_path())?;
    let mut session = Session::open(Storage::new(config.resolved_data_path()));

    println!("Hello! I'm tk.");
    println!("What can I do for you?");
    if let Some(warning) = session.take_warning() {
        println!("{}", warning);
    }

    let now = chrono::Local::now().naive_local();
    let due = reminder::due_reminders(session.tasks().tasks(), now, config.reminder_policy());
    if !due.is_empty() {
        println!("Reminders:");
        for (index, task) in due {
            println!("{}.{}", index, task);
        }
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut input = stdin.lock().lines();
    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = input.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        println!("{}", session.execute(&line));
        if parser::is_exit(&line) {
            break;
        }
    }
    Ok(())
}
