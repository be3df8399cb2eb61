// # Built-in Providers
//
// Providers that need nothing beyond the core's own dependencies live here.
// Network and database providers ship as separate crates.

pub mod config;

pub use config::{ConfigProvider, ConfigProviderFactory};
