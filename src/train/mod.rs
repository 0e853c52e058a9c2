pub mod epoch_stats;
pub mod evaluate;
pub mod loop_fn;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use evaluate::Evaluation;
pub use loop_fn::batch_ranges;
pub use train_config::TrainConfig;
