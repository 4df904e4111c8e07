pub mod accounts;
pub mod actions;
pub mod amounts;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod proxy;
pub mod retry;
pub mod runner;
pub mod schedule;
pub mod selection;
pub mod tasks;
