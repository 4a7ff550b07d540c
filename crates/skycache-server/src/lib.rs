//! HTTP surface for SkyCache.

pub mod handlers;
pub mod html;
pub mod params;

use skycache_weather::WeatherFetcher;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::params::Query;

const MAX_FORM_BYTES: u64 = 16 * 1024;

fn with_fetcher(
    fetcher: Arc<WeatherFetcher>,
) -> impl Filter<Extract = (Arc<WeatherFetcher>,), Error = Infallible> + Clone {
    warp::any().map(move || fetcher.clone())
}

/// All routes, wrapped in request tracing.
pub fn routes(
    fetcher: Arc<WeatherFetcher>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let home_get = warp::path::end()
        .and(warp::get())
        .map(Query::new)
        .and(with_fetcher(fetcher.clone()))
        .and_then(handlers::home);

    let home_post = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<Query>())
        .and(with_fetcher(fetcher.clone()))
        .and_then(handlers::home);

    let weather = warp::path("weather")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<Query>())
        .and(with_fetcher(fetcher.clone()))
        .and_then(handlers::current_weather);

    let forecast = warp::path("forecast")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<Query>())
        .and(with_fetcher(fetcher.clone()))
        .and_then(handlers::forecast_list);

    let forecast_detail = warp::path!("forecast" / String / usize)
        .and(warp::get())
        .and(with_fetcher(fetcher))
        .and_then(handlers::forecast_detail);

    home_get
        .or(home_post)
        .or(weather)
        .or(forecast)
        .or(forecast_detail)
        .with(warp::trace::request())
}
