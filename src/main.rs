use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

use market_api::configuration::get_configuration;
use market_api::startup::run;
use market_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "configuration error",
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "database error")
        })?;

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!(
        address = %address,
        environment = %configuration.application.environment,
        "server starting"
    );

    run(listener, pool, configuration)?.await
}
