//! One-shot prediction.

use clap::{ArgGroup, Args};

use ecourban_core::{predict_next_energy, EnergySeries, WINDOW_SIZE};

use super::Workspace;

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["values", "from_dataset"])))]
pub struct PredictArgs {
    /// Last 24 hourly readings, oldest first (comma separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    values: Vec<f64>,
    /// Use the last 24 readings of the dataset
    #[arg(long)]
    from_dataset: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::open()?;

    let values = if args.from_dataset {
        EnergySeries::read_csv(&ws.paths.dataset)?.tail(WINDOW_SIZE)
    } else {
        args.values
    };

    let predicted = predict_next_energy(&ws.paths, &values)?;

    if args.json {
        let body = serde_json::json!({ "predicted_energy": predicted });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Predicted energy for the next hour: {predicted:.2}");
    }
    Ok(())
}
