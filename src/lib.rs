pub mod api;
pub mod catalog;
pub mod config;
pub mod data_models;
pub mod error;
pub mod query_engine;
pub mod report;
pub mod summarizer;
