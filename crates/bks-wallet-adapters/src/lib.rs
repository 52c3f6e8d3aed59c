pub mod backend;
pub mod config;
pub mod eip1193;

pub use backend::EventBackendAdapter;
pub use config::{AdapterConfig, ConfigError, RuntimeProfile};
pub use eip1193::{Eip1193Adapter, DETERMINISTIC_ACCOUNT};
