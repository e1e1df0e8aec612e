pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod parsers;
pub mod reports;
pub mod restructure;
pub mod runner;
pub mod scrapers;
pub mod utils;
