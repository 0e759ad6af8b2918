//! Error transport in a production configuration.
//!
//! Lives in its own binary: the detailed-error switch is set once per
//! process, exactly as server startup sets it from the loaded settings.

use actix_web::body::to_bytes;
use actix_web::error::ResponseError;
use actix_web::http::StatusCode;

use market_api::configuration::ApplicationSettings;
use market_api::error::{set_detailed_errors, AppError};

#[actix_web::test]
async fn production_configuration_withholds_internal_causes() {
    // Environment comes from the configuration file alone; no APP__*
    // variables are involved.
    let application = ApplicationSettings {
        port: 8080,
        environment: "production".to_string(),
    };
    set_detailed_errors(!application.is_production());

    let err = AppError::internal_with_cause(
        "failed to create connection pool",
        "connection refused: postgres://app:s3cret@db:5432/market",
    );

    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(
        !body.contains("s3cret"),
        "response body leaked the cause: {}",
        body
    );
    assert!(body.contains("Internal server error"));
    assert!(!body.contains("details"));
}
