use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::{Json, RequestPartsExt};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use futures::future::BoxFuture;
use http::StatusCode;
use serde_json::json;
use tower::Layer;
use tower_service::Service;

use crate::{Error, Validator};

/// `tower` layer that admits only requests carrying a valid ID token as bearer token.
///
/// The validated [`Claims`](crate::Claims) are inserted into the request extensions, so handlers can extract them with
/// `Extension<Claims>`.
#[derive(Clone)]
pub struct AuthorizationLayer {
    validator: Arc<Validator>,
    audience: String,
}

impl AuthorizationLayer {
    pub fn new(validator: Arc<Validator>, audience: String) -> Self {
        Self {
            validator,
            audience,
        }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationService {
            inner,
            validator: Arc::clone(&self.validator),
            audience: self.audience.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    validator: Arc<Validator>,
    audience: String,
}

impl<S> Service<Request> for AuthorizationService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // Move the original service into the closure instead of its clone. This makes sure that the original service is
        // `call`ed instead of the cloned one, which might not be ready yet (`poll_ready` hasn't been called on the
        // clone yet).
        // See [docs](https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services).
        let inner_clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner_clone);

        let validator = Arc::clone(&self.validator);
        let audience = self.audience.clone();
        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            let authorize_result = async {
                let TypedHeader(Authorization(bearer)) = parts
                    .extract::<TypedHeader<Authorization<Bearer>>>()
                    .await?;
                Ok::<_, Rejection>(validator.check(bearer.token(), &audience).await?)
            }
            .await;

            match authorize_result {
                Ok(claims) => {
                    parts.extensions.insert(claims);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

/// Why a request was turned away.
#[derive(thiserror::Error, Debug)]
enum Rejection {
    #[error(transparent)]
    MissingBearerToken(#[from] TypedHeaderRejection),
    #[error(transparent)]
    InvalidToken(#[from] Error),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Rejection::MissingBearerToken(_) => StatusCode::UNAUTHORIZED,
            Rejection::InvalidToken(err) => err.status_code(),
        };
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status_code, body).into_response()
    }
}
