//! BKS Backstage marketplace shell.
//!
//! Headless screen models for the home hero, the event explorer and the about
//! page. Rendering is left to whatever front end drives these models.

pub mod about;
pub mod explorer;
pub mod hero;

use std::sync::Arc;

use thiserror::Error;

use bks_wallet_adapters::{AdapterConfig, ConfigError, Eip1193Adapter, EventBackendAdapter};
use bks_wallet_core::PortError;

pub use about::{AboutScreen, SocialLink};
pub use explorer::ExplorerScreen;
pub use hero::{HeroScreen, HeroView, NavIntent};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("wallet provider: {0}")]
    Provider(#[from] PortError),
}

/// Screens wired against the runtime adapters selected by `config`.
pub struct Shell {
    pub config: AdapterConfig,
    pub hero: HeroScreen<Eip1193Adapter>,
    pub explorer: ExplorerScreen<EventBackendAdapter>,
    pub about: AboutScreen,
}

impl Shell {
    pub fn from_env() -> Result<Self, ShellError> {
        Self::from_config(AdapterConfig::from_env()?)
    }

    pub fn from_config(config: AdapterConfig) -> Result<Self, ShellError> {
        let provider = Arc::new(Eip1193Adapter::with_config(config.clone()));
        let hero = HeroScreen::mount(provider)?;
        let explorer = ExplorerScreen::new(
            EventBackendAdapter::with_config(&config),
            config.api_base_url.clone(),
        );
        Ok(Self {
            config,
            hero,
            explorer,
            about: AboutScreen,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_tracing() {
    tracing_wasm::set_as_global_default();
}
