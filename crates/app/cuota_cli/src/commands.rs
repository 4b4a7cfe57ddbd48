//! Command handlers over `cuota_core`.

use std::sync::Arc;

use cuota_core::api::HttpAuthApi;
use cuota_core::config::CoreConfig;
use cuota_core::guard::{self, RouteDecision};
use cuota_core::jwt;
use cuota_core::models::Role;
use cuota_core::poller::ExpirationPoller;
use cuota_core::session::{FileSessionRepository, SessionStore};

use crate::cli::Commands;
use crate::{Error, Result};

fn build_store() -> Result<Arc<SessionStore>> {
    let config = CoreConfig::from_env()?;
    let api = Arc::new(HttpAuthApi::new(&config.api_base_url));
    let repository = Arc::new(FileSessionRepository::new(config.session_path));
    Ok(Arc::new(SessionStore::new(api, repository)))
}

pub async fn dispatch(command: Commands) -> Result<()> {
    let store = build_store()?;

    match command {
        Commands::Login { email, password } => {
            store.login(&email, &password).await?;
            if let Some(user) = store.snapshot().await.user {
                println!("Logged in as {} ({})", user.email, user.role);
            }
            Ok(())
        }
        Commands::Status => status(&store).await,
        Commands::Whoami => {
            let session = store.snapshot().await;
            match session.user.filter(|_| session.is_authenticated) {
                Some(user) => {
                    println!("{} ({})", user.email, user.role);
                    Ok(())
                }
                None => Err(Error::NotLoggedIn),
            }
        }
        Commands::Refresh => {
            store.refresh_tokens().await?;
            println!("Token refreshed");
            Ok(())
        }
        Commands::Watch => {
            if !store.snapshot().await.is_authenticated {
                return Err(Error::NotLoggedIn);
            }
            let poller = ExpirationPoller::new(store.clone());
            let handle = poller.spawn();
            log::info!("watching session; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            handle.abort();
            Ok(())
        }
        Commands::Logout => {
            store.logout().await;
            println!("Logged out");
            Ok(())
        }
    }
}

async fn status(store: &SessionStore) -> Result<()> {
    let session = store.snapshot().await;
    if !session.is_authenticated {
        println!("Not logged in");
        return Ok(());
    }

    if let (Some(user), Some(access)) = (session.user.as_ref(), session.access_token.as_deref()) {
        println!("Logged in as {} ({})", user.email, user.role);
        if jwt::is_expired(access) {
            println!("Access token: expired");
        } else if jwt::is_expiring_soon(access, jwt::EXPIRY_THRESHOLD_SECS) {
            println!("Access token: expiring soon");
        } else {
            println!("Access token: valid");
        }
        let landing = match guard::decide(Role::Admin, &session) {
            RouteDecision::Render => "admin panel",
            _ => "user dashboard",
        };
        println!("Default view: {landing}");
    }
    Ok(())
}
