use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::{web::Data, App, HttpServer};
use alco_front::canonical::CanonicalUrlBuilder;
use alco_front::config::{Args, Config};
use alco_front::control::{self, AppState};
use alco_graphql::{AlcoholFilter, AlcoholSource, GraphQlSource};
use anyhow::Context as AnyhowContext;
use clap::Parser;
use std::env;
use std::sync::Arc;
use tokio::signal;

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    let config = Config::load(&Args::parse())?;
    log::info!(
        "Serving {} ({} / {}) from {}",
        config.site_url,
        config.alcohol_type,
        config.lang_code,
        config.gql_host
    );

    let source: Arc<dyn AlcoholSource> =
        Arc::new(GraphQlSource::new(config.gql_host.clone(), config.ngrok_header));
    let state = Data::new(AppState {
        source,
        builder: CanonicalUrlBuilder::new(&config.site_url),
        filter: AlcoholFilter::new(config.alcohol_type.clone(), config.lang_code.clone()),
    });

    let port = config.port;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .app_data(state.clone())
            .configure(control::configure)
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("Failed to bind server to 0.0.0.0:{port}. Is the port already in use?"))?
    .disable_signals()
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        match signal::ctrl_c().await {
            Ok(_) => {
                log::info!("Shutting down");
                handle.stop(true).await;
            }
            Err(err) => log::error!("Unable to listen to shutdown: {err}"),
        }
    });

    server.await?;
    Ok(())
}
