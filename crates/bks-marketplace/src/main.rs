//! bks-marketplace: headless marketplace shell

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> eyre::Result<()> {
    bks_marketplace::init_tracing();

    tracing::info!("Starting bks-marketplace");

    let mut shell = bks_marketplace::Shell::from_env()?;
    tracing::info!(
        provider = shell.hero.bridge().provider().mode_label(),
        profile = ?shell.config.runtime_profile,
        "shell mounted"
    );

    if shell.hero.connect().await.is_none() {
        if let Some(e) = shell.hero.bridge().last_error() {
            tracing::warn!(error = %e, "wallet not connected");
        }
    }
    shell.hero.pump_events().await;
    let view = shell.hero.view();
    tracing::info!(
        account = ?view.account,
        chain = ?view.chain,
        balance = ?view.balance,
        intents = ?shell.hero.nav_intents(),
        "hero session"
    );

    if shell.config.api_base_url.is_some() {
        shell.explorer.load().await?;
        for card in shell.explorer.visible() {
            tracing::info!(
                id = %card.id,
                name = %card.name,
                likes = card.likes_count(),
                sold_out = card.is_sold_out(),
                "event"
            );
        }
    }

    shell.hero.unmount();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    bks_marketplace::init_tracing();
    tracing::info!("bks-marketplace screens are driven by the host page");
}
