use reqwest::header::{COOKIE, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Request};
use url::Url;

use crate::config::{HttpMethod, RequestTemplate};
use crate::error::HttpError;

const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Builds a reqwest request from a template.
///
/// # Errors
///
/// Returns an error when the URI or a header is invalid, or when reqwest
/// refuses the assembled request.
pub fn build_request(client: &Client, template: &RequestTemplate) -> Result<Request, HttpError> {
    let url = Url::parse(&template.uri).map_err(|err| HttpError::InvalidUrl {
        url: template.uri.clone(),
        source: err,
    })?;

    let mut builder = client
        .request(to_reqwest_method(template.method), url)
        .header(USER_AGENT, template.user_agent_header());

    for header in &template.headers {
        let name = HeaderName::from_bytes(header.name.trim().as_bytes()).map_err(|_err| {
            HttpError::InvalidHeader {
                name: header.name.clone(),
            }
        })?;
        let value = HeaderValue::from_str(&header.value).map_err(|_err| {
            HttpError::InvalidHeader {
                name: header.name.clone(),
            }
        })?;
        builder = builder.header(name, value);
    }

    if let Some(cookies) = template.cookie_header() {
        builder = builder.header(COOKIE, cookies);
    }

    if !template.body.is_empty() {
        builder = builder.body(template.body.clone());
    }

    builder
        .build()
        .map_err(|err| HttpError::BuildRequestFailed { source: err })
}
