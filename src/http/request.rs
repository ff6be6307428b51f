//! Request identification and body parsing.
//!
//! # Responsibilities
//! - Generate or propagate a unique request ID (UUID v4)
//! - Parse JSON bodies into typed requests with enveloped rejections
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied x-request-id is propagated, not replaced
//! - Malformed bodies surface in the same JSON error envelope as every
//!   other failure, not as framework plain-text rejections

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderValue;
use axum::response::Response;
use axum::Json;
use serde::de::DeserializeOwned;
use tower::{Layer, Service};
use uuid::Uuid;

use crate::http::response::ApiError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier assigned to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Extension trait for reading the request ID off a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for Request<Body> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Layer that assigns request IDs and echoes them on responses.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(RequestId::generate);

        if let Ok(value) = HeaderValue::from_str(&id.0) {
            req.headers_mut().insert(X_REQUEST_ID, value);
        }
        req.extensions_mut().insert(id.clone());

        let future = self.inner.call(req);
        Box::pin(async move {
            let mut response = future.await?;
            if let Ok(value) = HeaderValue::from_str(&id.0) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Ok(response)
        })
    }
}

/// JSON body extractor whose rejection is an [`ApiError`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn test_request_id_ext_reads_extension() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert!(req.request_id().is_none());

        req.extensions_mut()
            .insert(RequestId("req-1".to_string()));
        assert_eq!(req.request_id().unwrap().0, "req-1");
    }
}
