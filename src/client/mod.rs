//! monday.com API client.
//!
//! [`MondayClient`] posts GraphQL documents to the monday.com endpoint. The
//! [`GraphQl`] trait is the seam the extractor depends on, so pagination can
//! be driven by any transport that answers queries.

mod monday;

pub use monday::MondayClient;

use eyre::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// A GraphQL document plus its variables, serialized as the POST body
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    pub fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }
}

/// Anything that can answer a GraphQL request with a JSON document
pub trait GraphQl: Send + Sync {
    /// Execute the request and return the full response body
    ///
    /// # Errors
    /// Returns an error if the request cannot be sent, the server answers
    /// with a non-success status, or the body is not JSON
    fn execute(
        &self,
        request: &GraphQlRequest,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;
}
