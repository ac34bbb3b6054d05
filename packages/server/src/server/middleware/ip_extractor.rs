use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Client address of the current request, used to key anonymous views
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Middleware storing the client address in request extensions
///
/// Forwarding headers are client-controlled, so they are read only when
/// `trust_proxy_headers` is set (the server sits behind a proxy that
/// overwrites them). Priority then is:
/// 1. X-Forwarded-For header (first hop)
/// 2. X-Real-IP header
/// 3. Socket address, when the server was started with connect info
pub async fn extract_client_ip(
    trust_proxy_headers: bool,
    mut request: Request,
    next: Next,
) -> Response {
    let socket = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = client_ip(request.headers(), socket, trust_proxy_headers) {
        request.extensions_mut().insert(ClientIp(ip));
    }

    next.run(request).await
}

fn client_ip(
    headers: &HeaderMap,
    socket: Option<IpAddr>,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    if !trust_proxy_headers {
        return socket;
    }

    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .or(socket)
}
