/// HTTP middleware utilities for blog-service
///
/// Token checks happen inside the services, so the transport layer only
/// forwards the raw bearer token. Every API request is counted and timed
/// in prometheus under its route pattern.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::metrics::http::{observe_request, UNMATCHED_ROUTE};

// =====================================================================
// Bearer token extraction
// =====================================================================

/// Raw token from the `Authorization: Bearer ...` header, if any
///
/// Extraction never fails; an absent or malformed header yields `None` and
/// the service decides whether that is an error.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        ready(Ok(BearerToken(token)))
    }
}

// =====================================================================
// Request metrics
// =====================================================================

/// Feeds `blog_http_requests_total` and `blog_http_request_duration_seconds`
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestMetrics<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetrics {
            inner: Rc::new(service),
        }))
    }
}

pub struct RequestMetrics<S> {
    inner: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestMetrics<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(inner);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inner = self.inner.clone();
        let method = req.method().to_string();
        let started = Instant::now();

        Box::pin(async move {
            let outcome = inner.call(req).await;
            let elapsed = started.elapsed().as_secs_f64();

            // The pattern is only known once the inner resource has matched
            let (route, status) = match &outcome {
                Ok(res) => (
                    res.request()
                        .match_pattern()
                        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string()),
                    res.status().as_u16(),
                ),
                Err(err) => (
                    UNMATCHED_ROUTE.to_string(),
                    err.as_response_error().status_code().as_u16(),
                ),
            };

            observe_request(&method, &route, status, elapsed);
            tracing::debug!(%method, %route, status, elapsed, "request completed");
            outcome
        })
    }
}
