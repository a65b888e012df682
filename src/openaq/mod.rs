mod client;
mod collector;
mod pagination;
mod query_builder;

pub use client::Client;
pub use collector::{CityCollector, CityQuery, Collection, CollectionReport, CollectorSettings};
