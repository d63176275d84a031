//! Training metrics and logging.
//!
//! ## Loggers
//!
//! - [`ConsoleLogger`]: Pretty-printed console output
//! - [`CSVLogger`]: CSV file logging for analysis
//! - [`MultiLogger`]: Combine multiple loggers

pub mod logger;

pub use logger::{
    TrainingSnapshot,
    MetricsLogger,
    ConsoleLogger,
    CSVLogger,
    MultiLogger,
};
