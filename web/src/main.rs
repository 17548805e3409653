use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use todo_web::{pages, store::Store};
use tower_http::trace::TraceLayer;

#[derive(Parser)]
struct Options {
    /// Port to listen on.
    #[arg(long, default_value_t = 7890)]
    port: u16,

    /// File todos are persisted to.
    #[arg(long, default_value = "todos.ron")]
    data: PathBuf,

    /// TLS certificate in PEM format; serves plain HTTP when omitted.
    #[arg(long, requires = "key")]
    cert: Option<PathBuf>,

    /// TLS private key in PEM format.
    #[arg(long, requires = "cert")]
    key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let options = Options::parse();

    let store = Arc::new(Store::load(&options.data)?);

    let app = pages::router()
        .layer(TraceLayer::new_for_http())
        .with_state(store);

    let addr = SocketAddr::from(([0; 4], options.port));
    tracing::info!(%addr, "listening");

    match (&options.cert, &options.key) {
        (Some(cert), Some(key)) => {
            let config = RustlsConfig::from_pem_file(cert, key).await?;

            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}
