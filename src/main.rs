use pennywise::config::Config;
use pennywise::server::{build_app, serve};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pennywise=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let (host, port) = (config.host.clone(), config.port);
    tracing::info!("Starting Pennywise {} on {}", pennywise::VERSION, config.address());

    let (_state, app) = build_app(config).expect("Failed to build application");

    let (port, handle) = serve(app, &host, port)
        .await
        .expect("Failed to bind address");

    tracing::info!("Listening on http://{}:{}", host, port);

    handle.await.expect("Server task panicked");
}
