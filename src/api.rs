use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::channel::Querier;
use crate::commands::CommandSet;
use crate::prefix::{IpVersion, PrefixStatistics, Proto, Session};
use crate::service::{self, PrefixStatisticsService};

mod models;

type SharedService<Q, C> = Arc<PrefixStatisticsService<Q, C>>;

fn bad_request(err: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
}

fn stats_response(
    result: Result<service::Result<PrefixStatistics>, tokio::task::JoinError>,
) -> Response {
    match result {
        Ok(Ok(stats)) => (
            StatusCode::OK,
            Json(models::PrefixStatsResponse::from(stats)),
        )
            .into_response(),
        Ok(Err(err)) => {
            log::error!("Failed to get prefix statistics: {}", err);
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
        Err(err) => {
            log::error!("Prefix statistics task failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to collect prefix statistics",
            )
                .into_response()
        }
    }
}

async fn table_stats<Q, C>(
    State(service): State<SharedService<Q, C>>,
    Path(ip_version): Path<String>,
) -> Response
where
    Q: Querier + 'static,
    C: CommandSet + 'static,
{
    let ip_version = match ip_version.parse::<IpVersion>() {
        Ok(ip_version) => ip_version,
        Err(err) => return bad_request(err),
    };

    let result =
        tokio::task::spawn_blocking(move || service.stats_for_table(ip_version)).await;
    stats_response(result)
}

async fn session_stats<Q, C>(
    State(service): State<SharedService<Q, C>>,
    Path(name): Path<String>,
    Query(params): Query<models::SessionParams>,
) -> Response
where
    Q: Querier + 'static,
    C: CommandSet + 'static,
{
    let ip_version = match params.ip_version.as_deref().unwrap_or("4").parse::<IpVersion>() {
        Ok(ip_version) => ip_version,
        Err(err) => return bad_request(err),
    };
    let proto = match params.proto.as_deref().unwrap_or_default().parse::<Proto>() {
        Ok(proto) => proto,
        Err(err) => return bad_request(err),
    };
    let session = match Session::new(&name, proto, ip_version) {
        Ok(session) => session,
        Err(err) => return bad_request(err),
    };

    let result =
        tokio::task::spawn_blocking(move || service.stats_for_session(&session)).await;
    stats_response(result)
}

/// Builds the HTTP routes serving prefix statistics as JSON.
pub fn router<Q, C>(service: SharedService<Q, C>) -> axum::Router
where
    Q: Querier + 'static,
    C: CommandSet + 'static,
{
    axum::Router::new()
        .route("/prefixes/table/{ip_version}", get(table_stats::<Q, C>))
        .route("/prefixes/session/{name}", get(session_stats::<Q, C>))
        .with_state(service)
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new<Q, C>(service: SharedService<Q, C>) -> Self
    where
        Q: Querier + 'static,
        C: CommandSet + 'static,
    {
        Self {
            router: router(service),
        }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Serving prefix statistics on {}", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service()).await
    }
}
