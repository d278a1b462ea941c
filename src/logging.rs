//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Multipart uploads, images and event streams are never buffered, only
/// their headers are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request = if has_text_body(request.headers()) {
        let (parts, body) = request.into_parts();

        let body_text = match read_body_text(body).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!("Could not read request body: {error}");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        log_request(&parts, &body_text);
        Request::from_parts(parts, body_text.into())
    } else {
        let (parts, body) = request.into_parts();
        log_request(&parts, "<binary>");
        Request::from_parts(parts, body)
    };

    let response = next.run(request).await;

    if !has_text_body(response.headers()) {
        let (parts, body) = response.into_parts();
        log_response(&parts, "<binary>");
        return Response::from_parts(parts, body);
    }

    let (parts, body) = response.into_parts();

    match read_body_text(body).await {
        Ok(body_text) => {
            log_response(&parts, &body_text);
            Response::from_parts(parts, body_text.into())
        }
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn has_text_body(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return true;
    };

    !(content_type.starts_with("multipart/")
        || content_type.starts_with("image/")
        || content_type.starts_with("text/event-stream"))
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::CONTENT_TYPE};

    use super::{LOG_BODY_LENGTH_LIMIT, has_text_body, truncate};

    fn headers_with_content_type(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn skips_binary_and_streaming_bodies() {
        assert!(!has_text_body(&headers_with_content_type(
            "multipart/form-data; boundary=abc"
        )));
        assert!(!has_text_body(&headers_with_content_type("image/jpeg")));
        assert!(!has_text_body(&headers_with_content_type("text/event-stream")));
    }

    #[test]
    fn reads_text_bodies() {
        assert!(has_text_body(&headers_with_content_type(
            "application/x-www-form-urlencoded"
        )));
        assert!(has_text_body(&headers_with_content_type(
            "text/html; charset=utf-8"
        )));
        assert!(has_text_body(&HeaderMap::new()));
    }

    #[test]
    fn truncates_on_char_boundary() {
        let body = "₽".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&body);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(truncated.chars().all(|c| c == '₽'));
    }
}
