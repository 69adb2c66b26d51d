use bookrider_notify::{
    EnvToken, FileTokenStore, NotificationClient, NotificationListener, channels,
};
use tracing_subscriber::EnvFilter;

/// Listens on BookRider notification channels and logs a "toast" per message.
///
/// Channels come from the command line; without arguments the system
/// administrator channels are used. The token is read from the JSON file named
/// by `BOOKRIDER_TOKEN_FILE`, or from `BOOKRIDER_ACCESS_TOKEN`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut requested: Vec<String> = std::env::args().skip(1).collect();
    if requested.is_empty() {
        requested = vec![
            channels::LIBRARY_REQUESTS.to_string(),
            channels::DRIVER_APPLICATIONS.to_string(),
        ];
    }

    let client = match std::env::var("BOOKRIDER_TOKEN_FILE") {
        Ok(path) => NotificationClient::from_env(FileTokenStore::new(path))?,
        Err(_) => NotificationClient::from_env(EnvToken::default())?,
    };

    let mut listeners = Vec::new();
    for channel in requested {
        let toast = toast_text(&channel);
        let source = channel.clone();
        let mut listener = NotificationListener::new(client.clone(), move |payload| {
            tracing::info!(channel = %source, payload = %payload, "{}", toast);
        });

        listener.activate(&channel).await?;
        match listener.subscription() {
            Some(subscription) => {
                let mut events = subscription.events();
                let channel = channel.clone();
                tokio::spawn(async move {
                    while let Ok(event) = events.recv().await {
                        tracing::info!(channel = %channel, "{}", event);
                    }
                });
            }
            None => tracing::warn!(channel = %channel, "No access token, not listening"),
        }
        listeners.push(listener);
    }

    tokio::signal::ctrl_c().await?;

    for listener in &mut listeners {
        listener.deactivate().await;
    }
    Ok(())
}

fn toast_text(channel: &str) -> &'static str {
    match channel {
        channels::LIBRARY_REQUESTS => "New library registration request!",
        channels::DRIVER_APPLICATIONS => "New driver application!",
        channels::LIBRARIAN_PENDING_ORDERS => "New order received!",
        _ => "New notification",
    }
}
