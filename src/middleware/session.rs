use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::db::session_store::SessionStore;
use crate::middleware::session_context::Session;

pub const SESSION_COOKIE: &str = "sessionid";

/// Attaches a [`Session`] to every request. A session cookie is issued only
/// when the handler wrote to a session the browser did not already have.
pub struct SessionMiddleware {
    store: SessionStore,
}

impl SessionMiddleware {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            store: self.store.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    store: SessionStore,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let existing = req
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|key| self.store.touch(key));

        let had_session = existing.is_some();
        let session = Session::new(existing, self.store.clone());
        req.extensions_mut().insert(session.clone());

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if let Some(key) = session.key().filter(|_| !had_session) {
                let cookie = Cookie::build(SESSION_COOKIE, key.to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .finish();
                if let Err(err) = res.response_mut().add_cookie(&cookie) {
                    log::error!("Failed to set session cookie: {}", err);
                }
            }
            Ok(res)
        })
    }
}
