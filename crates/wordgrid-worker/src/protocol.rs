//! Message contract between a host and a worker instance.
//!
//! A host sends exactly one [`Request`] per worker instance. The reply is the
//! backend's result value, forwarded verbatim; there is no response envelope.
//! Field names follow the camelCase convention of the web host.

use std::{fmt, num::NonZeroUsize};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
};

/// Opaque identifier a host may attach to a request.
///
/// Any value the host sends is accepted and kept as is. The worker never
/// interprets it; it only shows up in diagnostics, strings verbatim and
/// everything else as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(serde_json::Value);

impl TaskId {
    /// Returns the value the host sent.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(text) => f.write_str(text),
            value => write!(f, "{value}"),
        }
    }
}

impl From<serde_json::Value> for TaskId {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Compiled backend module handed to the worker for initialization.
///
/// Accepts either a byte buffer (`Uint8Array` from a web host) or an array of
/// numbers (JSON hosts). Serializes as bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::From)]
pub struct ModuleImage(Vec<u8>);

impl ModuleImage {
    /// Returns the raw module bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the image holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for ModuleImage {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for ModuleImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ImageVisitor;

        impl<'de> Visitor<'de> for ImageVisitor {
            type Value = ModuleImage;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte buffer or an array of bytes")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(ModuleImage(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(ModuleImage(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                Ok(ModuleImage(bytes))
            }
        }

        deserializer.deserialize_byte_buf(ImageVisitor)
    }
}

/// The single request a worker instance accepts.
///
/// The grid type is chosen by the backend and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<G> {
    /// Backend module to initialize before solving.
    #[serde(rename = "wasm")]
    pub module: ModuleImage,
    /// Candidate words.
    pub wordlist: Vec<String>,
    /// Puzzle shape, opaque to the dispatcher.
    pub grid: G,
    /// Host-chosen identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Size of the parallel runtime; absent or `1` means no runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<u32>,
}

impl<G> Request<G> {
    /// Creates a request without an identifier or a thread count.
    pub fn new(module: impl Into<ModuleImage>, wordlist: Vec<String>, grid: G) -> Self {
        Self {
            module: module.into(),
            wordlist,
            grid,
            id: None,
            num_threads: None,
        }
    }

    /// Sets the host identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the requested thread count.
    #[must_use]
    pub fn with_num_threads(mut self, num_threads: u32) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Checks the request preconditions and returns the requested thread
    /// count, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the module image or the wordlist is
    /// empty, or if zero threads are requested.
    pub fn validate(&self) -> Result<Option<NonZeroUsize>, RequestError> {
        if self.module.is_empty() {
            return Err(RequestError::EmptyModule);
        }
        if self.wordlist.is_empty() {
            return Err(RequestError::EmptyWordlist);
        }
        match self.num_threads {
            None => Ok(None),
            Some(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Some)
                .ok_or(RequestError::ZeroThreads),
        }
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.into())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

/// A request that breaks the message contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RequestError {
    /// The module image is empty.
    #[display("module image is empty")]
    EmptyModule,
    /// The wordlist is empty.
    #[display("wordlist is empty")]
    EmptyWordlist,
    /// `numThreads` was zero.
    #[display("thread count must be at least 1")]
    ZeroThreads,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> Request<Vec<Vec<usize>>> {
        Request::new(
            vec![0_u8, 97, 115, 109],
            vec!["cat".to_owned(), "dog".to_owned()],
            vec![vec![0, 1], vec![2, 3]],
        )
    }

    #[test]
    fn test_request_wire_names() {
        let value = serde_json::to_value(request().with_id(7_u64).with_num_threads(4)).unwrap();
        assert_eq!(
            value,
            json!({
                "wasm": [0, 97, 115, 109],
                "wordlist": ["cat", "dog"],
                "grid": [[0, 1], [2, 3]],
                "id": 7,
                "numThreads": 4,
            })
        );
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let parsed: Request<Vec<Vec<usize>>> = serde_json::from_value(json!({
            "wasm": [1, 2, 3],
            "wordlist": ["cat"],
            "grid": [[0]],
        }))
        .unwrap();

        assert_eq!(parsed.module.as_bytes(), [1, 2, 3]);
        assert_eq!(parsed.id, None);
        assert_eq!(parsed.num_threads, None);
    }

    #[test]
    fn test_task_id_accepts_numbers_and_strings() {
        let parsed: Request<Vec<Vec<usize>>> = serde_json::from_value(json!({
            "wasm": [1],
            "wordlist": ["cat"],
            "grid": [],
            "id": "job-1",
        }))
        .unwrap();
        assert_eq!(parsed.id, Some(TaskId::from("job-1")));
        assert_eq!(TaskId::from(3_u64).to_string(), "3");
    }

    #[test]
    fn test_task_id_accepts_any_host_value() {
        for (id, rendered) in [
            (json!(1.5), "1.5"),
            (json!({ "job": 1 }), r#"{"job":1}"#),
            (json!([1, "a"]), r#"[1,"a"]"#),
            (json!(true), "true"),
            (json!(-4), "-4"),
        ] {
            let parsed: Request<Vec<Vec<usize>>> = serde_json::from_value(json!({
                "wasm": [1],
                "wordlist": ["cat"],
                "grid": [[0]],
                "id": id.clone(),
            }))
            .unwrap();

            let parsed_id = parsed.id.unwrap();
            assert_eq!(parsed_id.as_value(), &id);
            assert_eq!(parsed_id.to_string(), rendered);
        }
    }

    #[test]
    fn test_task_id_is_echoed_unchanged() {
        let request = request().with_id(TaskId::from(json!({ "job": [1, 2] })));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], json!({ "job": [1, 2] }));
    }

    #[test]
    fn test_validate_returns_requested_threads() {
        assert_eq!(request().validate(), Ok(None));
        assert_eq!(
            request().with_num_threads(4).validate(),
            Ok(NonZeroUsize::new(4))
        );
    }

    #[test]
    fn test_validate_rejects_broken_requests() {
        let mut empty_module = request();
        empty_module.module = ModuleImage::default();
        assert_eq!(empty_module.validate(), Err(RequestError::EmptyModule));

        let mut empty_words = request();
        empty_words.wordlist.clear();
        assert_eq!(empty_words.validate(), Err(RequestError::EmptyWordlist));

        assert_eq!(
            request().with_num_threads(0).validate(),
            Err(RequestError::ZeroThreads)
        );
    }
}
