//! Query-string assembly for tile requests.
//!
//! The tiler accepts short tokens like `0,4000` and `B04|1` literally, and
//! the UIs it serves pass them unencoded, so those stay raw here. Values
//! that can carry arbitrary characters (asset hrefs, formulas) go through
//! form encoding.

use url::form_urlencoded;

/// Incrementally built query string.
#[derive(Debug, Default)]
pub(crate) struct QueryString {
    buf: String,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value` with the value taken verbatim.
    pub fn push(&mut self, key: &str, value: &str) {
        if !self.buf.is_empty() {
            self.buf.push('&');
        }
        self.buf.push_str(key);
        self.buf.push('=');
        self.buf.push_str(value);
    }

    /// Appends `key=value` with the value form-encoded.
    pub fn push_encoded(&mut self, key: &str, value: &str) {
        let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
        self.push(key, &encoded);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_stay_literal() {
        let mut q = QueryString::new();
        q.push("rescale", "0,4000");
        q.push("asset_bidx", "red|1");
        assert_eq!(q.as_str(), "rescale=0,4000&asset_bidx=red|1");
    }

    #[test]
    fn encoded_values_are_escaped() {
        let mut q = QueryString::new();
        q.push_encoded("url", "https://example.com/a b.tif?x=1");
        assert_eq!(
            q.as_str(),
            "url=https%3A%2F%2Fexample.com%2Fa+b.tif%3Fx%3D1"
        );
    }

    #[test]
    fn formula_plus_sign_is_escaped() {
        let mut q = QueryString::new();
        q.push_encoded("expression", "(B08-B04)/(B08+B04)");
        assert_eq!(q.as_str(), "expression=%28B08-B04%29%2F%28B08%2BB04%29");
    }

    #[test]
    fn empty_query() {
        let q = QueryString::new();
        assert_eq!(q.into_string(), "");
    }
}
