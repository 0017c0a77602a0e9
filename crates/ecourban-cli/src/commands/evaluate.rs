//! Model evaluation against the stored dataset.

use clap::Args;

use ecourban_core::{evaluate, render_ascii_chart};

use super::Workspace;

#[derive(Args)]
pub struct EvaluateArgs {
    /// Number of most recent points to chart
    #[arg(long, default_value_t = 48)]
    limit: usize,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::open()?;
    let report = evaluate(&ws.paths)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}",
        render_ascii_chart(&report.actual, &report.predicted, args.limit)
    );
    println!("Summary:");
    println!("  Samples: {}", report.samples);
    println!("  MAE:  {:.4}", report.mae);
    println!("  RMSE: {:.4}", report.rmse);
    println!("  R²:   {:.4}", report.r2);
    Ok(())
}
