//! Concurrency-limiting middleware
//!
//! Bounds the number of in-flight requests with a semaphore rather than a
//! token-bucket rate — spec §5 calls for a hard cap with no internal queue,
//! not a requests-per-minute quota.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::errors::AppError;

/// Concurrency-limiting middleware factory. `Clone` shares the same
/// semaphore, so constructing one instance and cloning it into every
/// `HttpServer::new` worker keeps `max_inflight_requests` a process-wide
/// cap rather than a per-worker one (spec §5).
#[derive(Clone)]
pub struct ConcurrencyLimit {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimit {
    pub fn new(max_inflight_requests: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_inflight_requests.max(1))),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ConcurrencyLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ConcurrencyLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ConcurrencyLimitMiddleware {
            service: Rc::new(service),
            semaphore: self.semaphore.clone(),
        })
    }
}

pub struct ConcurrencyLimitMiddleware<S> {
    service: Rc<S>,
    semaphore: Arc<Semaphore>,
}

impl<S, B> Service<ServiceRequest> for ConcurrencyLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let semaphore = self.semaphore.clone();

        Box::pin(async move {
            let permit = match semaphore.try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(
                        "rejecting request, no inflight capacity left: {:?}",
                        req.connection_info().peer_addr()
                    );
                    return Err(AppError::TooManyInflight.into());
                }
            };

            let response = service.call(req).await;
            drop(permit);
            response
        })
    }
}
