//! Model training.

use clap::Args;

use ecourban_core::train_and_save;

use super::Workspace;

#[derive(Args)]
pub struct TrainArgs {
    /// Maximum number of epochs
    #[arg(long)]
    epochs: Option<usize>,
    /// Mini-batch size
    #[arg(long)]
    batch_size: Option<usize>,
    /// Epochs without validation improvement before stopping
    #[arg(long)]
    patience: Option<usize>,
    /// LSTM hidden units
    #[arg(long)]
    hidden_size: Option<usize>,
    /// Seed for weight init and batch order
    #[arg(long)]
    seed: Option<u64>,
    /// Print the training report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::open()?;
    let mut training = ws.config.training.clone();
    if let Some(epochs) = args.epochs {
        training.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        training.batch_size = batch_size;
    }
    if let Some(patience) = args.patience {
        training.patience = patience;
    }
    if let Some(hidden_size) = args.hidden_size {
        training.hidden_size = hidden_size;
    }
    if let Some(seed) = args.seed {
        training.seed = seed;
    }

    let report = train_and_save(&ws.paths, &training, &ws.config.synthetic)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Training finished:");
    println!("  Rows: {}", report.rows);
    println!(
        "  Windows: {} train / {} validation",
        report.train_samples, report.val_samples
    );
    for epoch in &report.history.epochs {
        match epoch.val_loss {
            Some(val) => println!(
                "  Epoch {:>3}: loss {:.6}  val_loss {:.6}",
                epoch.epoch, epoch.loss, val
            ),
            None => println!("  Epoch {:>3}: loss {:.6}", epoch.epoch, epoch.loss),
        }
    }
    println!(
        "  Best epoch: {}{}",
        report.history.best_epoch,
        if report.history.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );
    println!("  Model saved to {}", report.model_path.display());
    println!("  Scaler saved to {}", report.scaler_path.display());
    Ok(())
}
