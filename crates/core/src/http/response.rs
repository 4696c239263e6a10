use bytes::Bytes;
use url::Url;

use super::Headers;

/// A response with a single-consumption body.
///
/// Not `Clone`: the body can be read once, by consuming the response. Call
/// [`Response::tee`] to get two independent copies when one goes back to
/// the caller and the other into a cache store.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Headers,
    url: Option<Url>,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self { status, headers, url: None, body: body.into() }
    }

    /// Set the final URL the response was served from.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// Split into two independent responses carrying the same payload.
    pub fn tee(self) -> (Response, Response) {
        let copy = Response {
            status: self.status,
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: self.body.clone(),
        };
        (self, copy)
    }

    /// Consume the response and return its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Consume the response and decode its body as UTF-8, lossily.
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_parts(self) -> (u16, Headers, Option<Url>, Bytes) {
        (self.status, self.headers, self.url, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_range() {
        assert!(Response::new(200, Headers::new(), "").ok());
        assert!(Response::new(204, Headers::new(), "").ok());
        assert!(!Response::new(304, Headers::new(), "").ok());
        assert!(!Response::new(404, Headers::new(), "").ok());
    }

    #[test]
    fn test_tee_yields_independent_copies() {
        let headers: Headers = [("content-type", "text/css")].into_iter().collect();
        let response = Response::new(200, headers, "body { }").with_url(Url::parse("https://app.example/a.css").unwrap());

        let (first, second) = response.tee();
        assert_eq!(first.content_type(), Some("text/css"));
        assert_eq!(second.url().map(Url::as_str), Some("https://app.example/a.css"));
        assert_eq!(first.into_body(), Bytes::from_static(b"body { }"));
        assert_eq!(second.text(), "body { }");
    }
}
