use std::collections::HashSet;

use actix_web::http::header::{self, HeaderValue};
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};

const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, Baggage, sentry-trace, tracestate, traceparent";
const EXPOSE_HEADERS: &str = "Etag, Content-Range, Content-Length, Transfer-Encoding, tracestate, traceparent";

/// Origin allow-list for the signup form
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: HashSet<String>,
    dev: bool,
}

/// What to do with a request after checking its origin
pub enum CorsDecision {
    /// Answer immediately (rejected origin or preflight)
    Respond(HttpResponse),
    /// Handle normally, then add the headers with `finish`
    Proceed { origin: Option<String> },
}

impl CorsPolicy {
    pub fn new(allowed_origins: &[String], dev: bool) -> Self {
        CorsPolicy {
            allowed_origins: allowed_origins.iter().cloned().collect(),
            dev,
        }
    }

    pub fn evaluate(&self, req: &HttpRequest) -> CorsDecision {
        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !self.dev {
            if let Some(origin) = &origin {
                if !self.allowed_origins.contains(origin) {
                    return CorsDecision::Respond(HttpResponse::Unauthorized().finish());
                }
            }
        }

        if *req.method() == Method::OPTIONS {
            let mut response = HttpResponse::NoContent();
            response
                .insert_header((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"))
                .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS))
                .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS))
                .insert_header((header::VARY, "Origin"));
            if let Some(origin) = &origin {
                response.insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.as_str()));
            }
            return CorsDecision::Respond(response.finish());
        }

        CorsDecision::Proceed { origin }
    }
}

/// Adds the CORS headers of an allowed, non-preflight request
pub fn finish(origin: Option<&str>, mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(EXPOSE_HEADERS));
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    fn policy(dev: bool) -> CorsPolicy {
        CorsPolicy::new(&["https://rigsketball.onarchival.dev".to_string()], dev)
    }

    #[test]
    fn unknown_origin_is_rejected_outside_dev() {
        let req = TestRequest::get()
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_http_request();
        match policy(false).evaluate(&req) {
            CorsDecision::Respond(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            CorsDecision::Proceed { .. } => panic!("origin should be rejected"),
        }
        assert!(matches!(policy(true).evaluate(&req), CorsDecision::Proceed { .. }));
    }

    #[test]
    fn preflight_answers_with_no_content() {
        let req = TestRequest::default()
            .method(Method::OPTIONS)
            .insert_header((header::ORIGIN, "https://rigsketball.onarchival.dev"))
            .to_http_request();
        let CorsDecision::Respond(resp) = policy(false).evaluate(&req) else {
            panic!("preflight should be answered directly");
        };
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://rigsketball.onarchival.dev"
        );
        assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), ALLOW_METHODS);
    }

    #[test]
    fn requests_without_origin_proceed() {
        let req = TestRequest::get().to_http_request();
        let CorsDecision::Proceed { origin } = policy(false).evaluate(&req) else {
            panic!("request without origin should proceed");
        };
        assert!(origin.is_none());

        let resp = finish(Some("https://rigsketball.onarchival.dev"), HttpResponse::Ok().finish());
        assert_eq!(resp.headers().get(header::VARY).unwrap(), "Origin");
        assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
    }
}
