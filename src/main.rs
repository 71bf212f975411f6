use anyhow::{anyhow, Context, Result};
use clap::{App, Arg};
use pressroom::client::Client;
use pressroom::config::{Config, Environment};
use pressroom::render::Theme;
use pressroom::server::{router, AppState};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = App::new("pressroom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Serves a blog from a headless WordPress backend")
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .value_name("DIR")
                .env("PRESSROOM_PROJECT")
                .default_value(".")
                .help("The directory to search (along with its parents) for pressroom.yaml"),
        )
        .arg(
            Arg::with_name("listen")
                .long("listen")
                .short("l")
                .value_name("ADDR")
                .env("PRESSROOM_LISTEN")
                .default_value("0.0.0.0:3000")
                .help("The address to listen on"),
        )
        .get_matches();

    // Both arguments have defaults.
    let project = matches.value_of("project").unwrap_or(".");
    let listen = matches.value_of("listen").unwrap_or("0.0.0.0:3000");

    let project_dir = Path::new(project)
        .canonicalize()
        .with_context(|| format!("Resolving project directory `{}`", project))?;
    let config = Config::from_directory(&project_dir, &Environment::from_process())?;
    let wordpress_url = config
        .wordpress_url
        .as_ref()
        .ok_or_else(|| anyhow!("No WordPress URL: set WORDPRESS_URL or `wordpress_url`"))?;
    let client = Client::new(wordpress_url, config.request_timeout)?;
    let theme = Theme::from_directory(&config.theme_directory)?;

    info!(
        site = %config.site.domain,
        wordpress = %wordpress_url,
        theme = %config.theme_directory.display(),
        "Loaded configuration"
    );

    let app = router(AppState {
        source: Arc::new(client),
        theme: Arc::new(theme),
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Binding to {}", listen))?;
    info!("Listening on {}", listen);
    axum::serve(listener, app).await?;
    Ok(())
}
