//! Route handlers.
//!
//! Each handler turns request input into a fetch, shapes the payload, and maps
//! [`AppError`] into a response. Handlers never fail at the warp level.

use serde::Serialize;
use skycache_core::AppError;
use skycache_weather::{Coord, Reading, WeatherFetcher};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};

use crate::html;
use crate::params::{self, ForecastItem, ForecastQuery, Query};

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
struct CurrentWeatherBody<'a> {
    city: &'a str,
    cached: bool,
    temp: &'a Reading,
    country: Option<&'a str>,
    coord: &'a Coord,
}

#[derive(Debug, Serialize)]
struct ForecastListBody<'a> {
    city: &'a str,
    cached: bool,
    count: usize,
    items: Vec<ForecastItem>,
}

#[derive(Debug, Serialize)]
struct ForecastDetailBody<'a> {
    city: &'a str,
    cached: bool,
    id: usize,
    time: &'a str,
    temp: &'a Reading,
    desc: &'a str,
    raw: &'a serde_json::Value,
}

fn status_of(err: &AppError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: AppError) -> Response {
    tracing::debug!("Request failed: {}", err);
    reply::with_status(
        reply::json(&ErrorBody {
            error: &err.to_string(),
        }),
        status_of(&err),
    )
    .into_response()
}

fn respond(result: Result<Response, AppError>) -> Result<Response, Infallible> {
    Ok(result.unwrap_or_else(error_response))
}

/// `GET|POST /`
pub async fn home(form: Query, fetcher: Arc<WeatherFetcher>) -> Result<Response, Infallible> {
    let city = params::city_or_default(&form);

    let response = match fetcher.current(&city).await {
        Ok(fetched) => reply::html(html::weather_page(&city, &fetched.payload)).into_response(),
        Err(e) => {
            let err = AppError::from(e);
            reply::with_status(reply::html(html::error_page(&err.to_string())), status_of(&err))
                .into_response()
        }
    };
    Ok(response)
}

async fn current_weather_response(
    query: &Query,
    fetcher: &WeatherFetcher,
) -> Result<Response, AppError> {
    let city = params::required_city(query)?;
    let fetched = fetcher.current(&city).await?;
    let current = &fetched.payload;

    Ok(reply::json(&CurrentWeatherBody {
        city: &city,
        cached: fetched.cached,
        temp: &current.temperature,
        country: current.country.as_deref(),
        coord: &current.coord,
    })
    .into_response())
}

/// `GET /weather?city=`
pub async fn current_weather(
    query: Query,
    fetcher: Arc<WeatherFetcher>,
) -> Result<Response, Infallible> {
    respond(current_weather_response(&query, &fetcher).await)
}

async fn forecast_list_response(
    query: &Query,
    fetcher: &WeatherFetcher,
) -> Result<Response, AppError> {
    let city = params::required_city(query)?;
    let filter = ForecastQuery::from_query(query)?;
    let fetched = fetcher.forecast(&city).await?;
    let items = filter.apply(&fetched.payload);

    Ok(reply::json(&ForecastListBody {
        city: &city,
        cached: fetched.cached,
        count: items.len(),
        items,
    })
    .into_response())
}

/// `GET /forecast?city=&min_temp=&max_temp=&limit=`
pub async fn forecast_list(
    query: Query,
    fetcher: Arc<WeatherFetcher>,
) -> Result<Response, Infallible> {
    respond(forecast_list_response(&query, &fetcher).await)
}

async fn forecast_detail_response(
    city: &str,
    item_id: usize,
    fetcher: &WeatherFetcher,
) -> Result<Response, AppError> {
    let fetched = fetcher.forecast(city).await?;
    let point = fetched
        .payload
        .point(item_id)
        .ok_or(AppError::InvalidIndex(item_id))?;

    Ok(reply::json(&ForecastDetailBody {
        city,
        cached: fetched.cached,
        id: item_id,
        time: &point.timestamp,
        temp: &point.temperature,
        desc: &point.description,
        raw: &point.raw,
    })
    .into_response())
}

/// `GET /forecast/{city}/{item_id}`
pub async fn forecast_detail(
    city: String,
    item_id: usize,
    fetcher: Arc<WeatherFetcher>,
) -> Result<Response, Infallible> {
    // Path segments arrive percent-encoded
    let city = match urlencoding::decode(&city) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return respond(Err(AppError::validation("invalid city"))),
    };

    respond(forecast_detail_response(&city, item_id, &fetcher).await)
}
