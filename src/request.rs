//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, Uri};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An incoming HTTP request with its body fully buffered and its routed path
/// parameters attached.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        uri: Uri,
        headers: Vec<(String, String)>,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, uri, headers, body, params }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first value for `name` from an urlencoded form body or,
    /// failing that, from the query string.
    ///
    /// The body is only consulted when the request declares
    /// `application/x-www-form-urlencoded`.
    pub fn form_value(&self, name: &str) -> Option<String> {
        let is_form = self
            .header("content-type")
            .is_some_and(|ct| ct.trim_start().starts_with(FORM_CONTENT_TYPE));

        let from_body = is_form
            .then(|| lookup(&self.body, name))
            .flatten();

        from_body.or_else(|| lookup(self.query()?.as_bytes(), name))
    }
}

fn lookup(encoded: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Builds a request the way the server would after routing.
    pub(crate) fn request(method: Method, uri: &str, headers: &[(&str, &str)], body: &str) -> Request {
        Request::new(
            method,
            uri.parse().unwrap(),
            headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            Bytes::copy_from_slice(body.as_bytes()),
            HashMap::new(),
        )
    }
}
