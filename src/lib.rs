pub mod accounts;
pub mod config;
pub mod dedup;
pub mod driver;
pub mod error;
pub mod logging;
pub mod relayer;
