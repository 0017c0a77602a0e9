//! Synthetic dataset generation.

use clap::Args;

use ecourban_core::generate_synthetic;

use super::Workspace;

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of days of hourly readings
    #[arg(long)]
    days: Option<u32>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Overwrite an existing dataset
    #[arg(long)]
    force: bool,
}

pub fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::open()?;
    let path = &ws.paths.dataset;
    if path.exists() && !args.force {
        return Err(format!(
            "dataset already exists at {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    let mut synthetic = ws.config.synthetic.clone();
    if let Some(days) = args.days {
        synthetic.days = days;
    }
    if let Some(seed) = args.seed {
        synthetic.seed = seed;
    }

    let series = generate_synthetic(&synthetic)?;
    series.write_csv(path)?;
    println!(
        "Generated {} hourly readings ({} days, seed {}) -> {}",
        series.len(),
        synthetic.days,
        synthetic.seed,
        path.display()
    );
    Ok(())
}
