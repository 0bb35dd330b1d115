//! `garage-server`: reads the configuration, builds the backend and serves

use anyhow::Result;
use garage::config::{AppConfig, BackendKind};
use garage::server::ServerBuilder;
use garage::storage::InMemoryIdentityProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "garage=info,garage_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let addr = config.bind_address();
    tracing::info!(backend = ?config.backend.kind, policy = ?config.orders.transition_policy, "configuration loaded");

    let builder = match config.backend.kind {
        BackendKind::InMemory => in_memory_builder(&config)?,
        BackendKind::Hosted => hosted_builder(&config)?,
    };

    builder.with_config(config).serve(&addr).await
}

fn in_memory_builder(config: &AppConfig) -> Result<ServerBuilder> {
    let mut identities = InMemoryIdentityProvider::new();
    if let Some(password) = &config.admin.seed_password {
        for email in &config.admin.emails {
            identities = identities.with_account(email, password)?;
            tracing::info!(email = %email, "seeded admin account");
        }
    } else {
        tracing::warn!("no admin seed password, admin routes are unreachable");
    }

    Ok(ServerBuilder::new()
        .with_identity_provider(identities)
        .with_in_memory_backend())
}

#[cfg(feature = "hosted")]
fn hosted_builder(config: &AppConfig) -> Result<ServerBuilder> {
    use garage::storage::{
        HostedClient, HostedGalleryRepository, HostedIdentityProvider, HostedOrderRepository,
        HostedVisitorRepository,
    };

    let client = HostedClient::from_config(&config.backend)?;
    if config.backend.service_key.is_none() {
        tracing::warn!("no service key, identity provisioning will fail");
    }

    Ok(ServerBuilder::new()
        .with_order_repository(HostedOrderRepository::new(client.clone()))
        .with_gallery_repository(HostedGalleryRepository::new(client.clone()))
        .with_visitor_repository(HostedVisitorRepository::new(client.clone()))
        .with_identity_provider(HostedIdentityProvider::new(client)))
}

#[cfg(not(feature = "hosted"))]
fn hosted_builder(_config: &AppConfig) -> Result<ServerBuilder> {
    anyhow::bail!("the hosted backend requires building with `--features hosted`")
}
