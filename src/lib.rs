pub mod calendar;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pager;
pub mod stats;
pub mod store;
