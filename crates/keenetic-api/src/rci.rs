// Batch RCI queries
//
// The router exposes its CLI tree over `/rci/`. Several logical queries can
// be sent in one POST as a JSON array; the router answers with an array in
// the same order. There are no request ids, so correlation is purely
// positional: a missing or reordered element shifts every later section.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::RouterClient;
use crate::error::Error;

const RCI_ROOT: &str = "/rci/";

/// One logical query in a batch: a path in the CLI tree plus optional leaf arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RciQuery {
    path: Vec<String>,
    args: Map<String, Value>,
}

impl RciQuery {
    /// Build a query from path segments, e.g. `["show", "ip", "hotspot"]`.
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            args: Map::new(),
        }
    }

    /// A `show ...` query.
    pub fn show(path: &[&str]) -> Self {
        Self::new(std::iter::once("show").chain(path.iter().copied()))
    }

    /// Add a leaf argument, e.g. `name` for `show interface stat`.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Space-separated label, as the router CLI would print it.
    pub fn label(&self) -> String {
        self.path.join(" ")
    }

    /// Render the nested request body: `{"show": {"ip": {"hotspot": {}}}}`.
    pub fn to_body(&self) -> Value {
        self.path
            .iter()
            .rev()
            .fold(Value::Object(self.args.clone()), |inner, segment| {
                let mut outer = Map::new();
                outer.insert(segment.clone(), inner);
                Value::Object(outer)
            })
    }

    /// Walk a response element down this query's path.
    pub fn extract(&self, response: &Value) -> Option<Value> {
        self.path
            .iter()
            .try_fold(response, |node, segment| node.get(segment))
            .cloned()
    }
}

/// Pair each query with the response element at the same index.
///
/// The output always has one entry per query. Missing elements and
/// missing path segments become `None`; surplus elements are dropped.
pub fn correlate(queries: &[RciQuery], items: Vec<Value>) -> Vec<Option<Value>> {
    if items.len() < queries.len() {
        warn!(
            expected = queries.len(),
            received = items.len(),
            "router returned fewer batch elements than queries"
        );
    } else if items.len() > queries.len() {
        warn!(
            expected = queries.len(),
            received = items.len(),
            "router returned extra batch elements; dropping them"
        );
    }

    let mut items = items.into_iter();
    queries
        .iter()
        .map(|query| {
            let section = items.next().and_then(|item| query.extract(&item));
            if section.is_none() {
                warn!(query = %query.label(), "section missing from batch response");
            }
            section
        })
        .collect()
}

impl RouterClient {
    /// Run several queries in one round trip.
    ///
    /// Element `i` of the result corresponds to `queries[i]`.
    pub async fn execute(&self, queries: &[RciQuery]) -> Result<Vec<Option<Value>>, Error> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let body = Value::Array(queries.iter().map(RciQuery::to_body).collect());
        debug!(count = queries.len(), "executing RCI batch");

        match self.post_json(RCI_ROOT, &body).await? {
            Value::Array(items) => Ok(correlate(queries, items)),
            other => Err(Error::Decode {
                message: "batch response is not a JSON array".into(),
                body: other.to_string(),
            }),
        }
    }

    /// Send a batch of raw command objects (writes followed by a save).
    pub(crate) async fn post_commands(&self, commands: Vec<Value>) -> Result<Value, Error> {
        self.post_json(RCI_ROOT, &Value::Array(commands)).await
    }
}
