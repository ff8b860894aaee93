use clap::Parser;
use http::Method;

use teller::middleware::Pipeline;
use teller::{Config, Router, Server, health, sink, telemetry};

#[tokio::main]
async fn main() -> Result<(), teller::Error> {
    let config = Config::parse();
    telemetry::init();

    tracing::info!(
        bind_addr = %config.bind_addr,
        audit = config.logging_enabled(),
        "teller v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let pipeline = Pipeline::new(sink::install(&config));

    let app = Router::new()
        .on(Method::GET, "/version", pipeline.wrap(health::version))
        .on(Method::GET, "/_ah/start", health::start)
        .on(Method::GET, "/_ah/stop", health::stop);

    Server::bind(&config.bind_addr)?.serve(app).await
}
