// src/routes.rs
use std::convert::Infallible;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{backtest::get_backtest, dividend::get_dividend, quote::get_quote};

// Translate typed engine errors into status codes; anything unrecognized
// is a 500.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.to_string();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid query parameters".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes() -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let backtest_route = warp::path!("api" / "v1" / "backtest")
        .and(warp::get())
        .and(warp::query())
        .and_then(get_backtest);

    let dividend_route = warp::path!("api" / "v1" / "dividend")
        .and(warp::get())
        .and(warp::query())
        .and_then(get_dividend);

    let quote_route = warp::path!("api" / "v1" / "quote")
        .and(warp::get())
        .and(warp::query())
        .and_then(get_quote);

    info!("All routes configured successfully.");

    backtest_route
        .or(dividend_route)
        .or(quote_route)
        .recover(handle_rejection)
}
