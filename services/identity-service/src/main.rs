//! Identity service entry point
//!
//! Configuration is read from `ENTITY_REST_*` environment variables and
//! `config.toml` files (see `entity_rest::config`), e.g.
//!
//! ```bash
//! ENTITY_REST_SERVICE__PORT=9000 cargo run -p identity-service
//! curl 'http://localhost:9000/api/roles?q=admin'
//! ```
//!
//! Built with `--features database` and given a `[database]` section, the
//! service stores everything in PostgreSQL.

use anyhow::Result;
use axum::Router;
use entity_rest::prelude::{init_tracing, Config, Server};
use identity_service::{app, Stores};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("identity-service")?;
    init_tracing(&config)?;

    let router = routes(&config).await?;
    Server::new(config).serve(router).await?;

    Ok(())
}

fn in_memory(config: &Config) -> Router {
    let stores = Stores::seeded();
    tracing::info!(
        roles = stores.roles.len(),
        permissions = stores.permissions.len(),
        "Seeded default roles and permissions"
    );
    app(config, stores)
}

#[cfg(feature = "database")]
async fn routes(config: &Config) -> Result<Router> {
    match &config.database {
        Some(database) => {
            let pool = entity_rest::database::create_pool(database).await?;
            tracing::info!("Serving users, roles and permissions from PostgreSQL");
            Ok(app(config, Stores::postgres(pool)))
        }
        None => Ok(in_memory(config)),
    }
}

#[cfg(not(feature = "database"))]
async fn routes(config: &Config) -> Result<Router> {
    if config.database.is_some() {
        tracing::warn!(
            "[database] is configured but this build has no `database` feature, using in-memory stores"
        );
    }
    Ok(in_memory(config))
}
