#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod generator;
mod records;
mod seeder;

pub use config::SeedConfig;
pub use error::{Result, SeedError};
pub use generator::{GeneratedPosition, RecordGenerator};
pub use records::{
    Account, AccountDocument, Instrument, InstrumentClassifications, InstrumentPrice,
    InstrumentRef, Party, Position, PositionDocument, Taxlot, Transaction,
};
pub use seeder::{SeedReport, Seeder};

/// Tracing target for data generation and bulk submission.
pub const TRACING_TARGET: &str = "pagebench_seed";
