//! Command-line driver: trains the cluster classifier and queries saved models.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use layerwise_nn::data::clusters::{self, CENTRES};
use layerwise_nn::{Network, TrainConfig};

#[derive(Parser)]
#[command(name = "layerwise-nn")]
#[command(about = "Train and query small feed-forward networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train fc(2→4)+sigmoid+fc(4→3)+sigmoid on three synthetic 2-D clusters
    Clusters {
        #[arg(long, default_value = "30")]
        epochs: usize,

        #[arg(long, default_value = "50")]
        batch_size: usize,

        #[arg(long, default_value = "0.9")]
        learning_rate: f64,

        /// Seed for data, initial weights and shuffling; random when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Number of training points
        #[arg(long, default_value = "3000")]
        train: usize,

        /// Number of test points
        #[arg(long, default_value = "600")]
        test: usize,

        /// Write the trained network snapshot to this JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Classify a point in the 500×500 plane with a saved cluster network
    Predict {
        #[arg(long)]
        model: PathBuf,

        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,
    },
}

fn parse_level(s: &str) -> Level {
    match s {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Clusters { epochs, batch_size, learning_rate, seed, train, test, save } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let data = clusters::generate(train, test, &mut rng)?;

            let mut net = Network::new(2)?;
            net.add_fc_layer(4, &mut rng)?
                .add_sigmoid_layer()?
                .add_fc_layer(3, &mut rng)?
                .add_sigmoid_layer()?;

            let config = TrainConfig::new(epochs, batch_size, learning_rate);
            let test_set = Some(data.test.as_slice()).filter(|t| !t.is_empty());
            let history = net.stochastic_gradient_descent(&data.training, &config, test_set, &mut rng)?;

            if let Some(last) = history.last() {
                match last.test_accuracy {
                    Some(acc) => println!("final test accuracy: {:.2}%", acc * 100.0),
                    None => println!("final train loss: {:.6}", last.train_loss),
                }
            }

            if let Some(path) = save {
                net.save_json(&path)
                    .with_context(|| format!("saving network to {}", path.display()))?;
            }
        }

        Commands::Predict { model, x, y } => {
            let mut net = Network::load_json(&model)
                .with_context(|| format!("loading network from {}", model.display()))?;
            let class = net
                .predict(&clusters::scale_point(x, y))?
                .first()
                .copied()
                .context("network produced no output column")?;
            let name = CENTRES.get(class).map(|c| c.2).unwrap_or("unknown");
            info!(x, y, class, "prediction");
            println!("{name}");
        }
    }

    Ok(())
}
