//! Redirects unauthenticated HTML requests to the auth service sign-in page.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, HttpResponse, web};

use crate::models::config::ServerConfig;

/// Used when the app carries no [`ServerConfig`].
pub const DEFAULT_LOGIN_URL: &str = "/auth/signin";

/// Turns every `401 Unauthorized` response into a `303 See Other` pointing at
/// the sign-in page.
pub struct RedirectUnauthorized;

impl<S, B> Transform<S, ServiceRequest> for RedirectUnauthorized
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RedirectUnauthorizedMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectUnauthorizedMiddleware { service }))
    }
}

pub struct RedirectUnauthorizedMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RedirectUnauthorizedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let login_url = req
            .app_data::<web::Data<ServerConfig>>()
            .map(|config| config.login_url())
            .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            if res.status() != StatusCode::UNAUTHORIZED {
                return Ok(res.map_into_left_body());
            }

            log::debug!("Redirecting unauthenticated request to {login_url}");
            let (req, _) = res.into_parts();
            let redirect = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, login_url))
                .finish()
                .map_into_right_body();
            Ok(ServiceResponse::new(req, redirect))
        })
    }
}
