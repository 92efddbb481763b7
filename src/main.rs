use std::fs::File;
use std::process::ExitCode;

use chorus::api;
use chorus::core::config::{self, ResolvedConfig};
use chorus::core::{CredentialStore, EnvCredentialStore, Orchestrator};
use chorus::inference::Mode;
use clap::{Parser, Subcommand};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

#[derive(Parser)]
#[command(name = "chorus", about = "One prompt, up to three LLM providers")]
struct Args {
    /// Provider to use, or "combined" for every provider with a key
    #[arg(short, long, value_enum, global = true)]
    mode: Option<Mode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a single prompt and print the reply
    Ask {
        /// The prompt text
        prompt: String,
    },
    /// Run the HTTP API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8787
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn init_logging(to_terminal: bool) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    // File logger - writes to chorus.log in current directory
    if let Ok(log_file) = File::create("chorus.log") {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config.clone(), log_file));
    }
    if to_terminal {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            log_config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    let _ = CombinedLogger::init(loggers);
}

async fn ask(config: &ResolvedConfig, prompt: &str) -> ExitCode {
    let orchestrator = Orchestrator::from_config(config);
    let credentials = EnvCredentialStore::new(config.file_credentials.clone()).credentials("cli");

    match orchestrator.compose(prompt, config.mode, &credentials).await {
        Ok(reply) => {
            println!("{reply}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    init_logging(matches!(args.command, Command::Serve { .. }));

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let cli_bind = match &args.command {
        Command::Serve { bind } => bind.as_deref(),
        Command::Ask { .. } => None,
    };
    let resolved = config::resolve(&file_config, args.mode, cli_bind);
    log::info!("Chorus starting up with mode: {:?}", resolved.mode);

    match &args.command {
        Command::Ask { prompt } => ask(&resolved, prompt).await,
        Command::Serve { .. } => match api::serve(&resolved).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("server error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
