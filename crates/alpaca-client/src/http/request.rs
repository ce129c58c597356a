//! Immutable request descriptors.
//!
//! A [`Request`] describes one HTTP call: method, path, query parameters and
//! an optional JSON body. Descriptors are built once per call, handed to the
//! [`HttpClient`](super::client::HttpClient) for execution, and discarded.
//! Authentication and content-type headers are attached by the client, not
//! stored here.

/// HTTP method for a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// DELETE request.
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// An immutable description of one HTTP call.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<String>,
}

impl Request {
    /// Start building a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Get, path)
    }

    /// Start building a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Post, path)
    }

    /// Start building a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Delete, path)
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// The request path, including any appended segments.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query parameters, in the order they were added.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The JSON body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Builder for [`Request`]. Consumed by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestBuilder {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a path segment, separated by `/`.
    #[must_use]
    pub fn segment(mut self, segment: impl AsRef<str>) -> Self {
        self.path.push('/');
        self.path.push_str(segment.as_ref());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Finish building the immutable request descriptor.
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query: self.query,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_with_segments_and_query() {
        let request = Request::get("/v2/orders")
            .segment("904837e3-3b76-47ec-b432-046db621571b")
            .query("status", "open")
            .query("limit", 50)
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(
            request.path(),
            "/v2/orders/904837e3-3b76-47ec-b432-046db621571b"
        );
        assert_eq!(request.query().len(), 2);
        assert_eq!(request.query()[1], ("limit".to_string(), "50".to_string()));
        assert!(request.body().is_none());
    }

    #[test]
    fn post_with_body() {
        let request = Request::post("/v2/orders")
            .body(r#"{"symbol":"AAPL"}"#)
            .build();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.body(), Some(r#"{"symbol":"AAPL"}"#));
    }

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
