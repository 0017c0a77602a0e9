use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "ecourban-cli", version, about = "EcoUrban energy forecasting CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Write the synthetic hourly dataset
    Generate(commands::generate::GenerateArgs),
    /// Train the model and save the artifacts
    Train(commands::train::TrainArgs),
    /// Predict the next hour from the last 24 readings
    Predict(commands::predict::PredictArgs),
    /// Score the saved model against the dataset
    Evaluate(commands::evaluate::EvaluateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Train(args) => commands::train::run(args),
        Commands::Predict(args) => commands::predict::run(args),
        Commands::Evaluate(args) => commands::evaluate::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
