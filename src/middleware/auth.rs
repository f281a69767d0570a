use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{is_public_endpoint, verify_token, Principal};
use crate::error::ApiError;

/// Authentication middleware. Requests to public endpoints pass through
/// untouched; everything else must carry a valid bearer token, whose verified
/// identity is injected into the request as a [`Principal`] extension.
pub async fn jwt_auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    if is_public_endpoint(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let claims = verify_token(&token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token. Please login again."))?;

    request.extensions_mut().insert(Principal::from(claims));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_str = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized("Authentication required. Please provide a valid Bearer token.")
        })?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized(
            "Authentication required. Please provide a valid Bearer token.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let headers = headers_with("Bearer   ");
        assert!(bearer_token(&headers).is_err());
    }
}
