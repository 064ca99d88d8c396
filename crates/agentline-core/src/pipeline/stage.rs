//! Stage descriptors

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::client::TaskSender;

/// Builds a stage request from the canonical query and earlier stage results.
pub type RequestBuilder = Arc<dyn Fn(&str, &StageOutputs) -> Value + Send + Sync>;

/// Parsed results of the stages that have completed so far, in run order
#[derive(Debug, Clone, Default)]
pub struct StageOutputs {
    entries: Vec<(String, Value)>,
}

impl StageOutputs {
    pub fn get(&self, stage: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, value)| value)
    }

    pub fn push(&mut self, stage: impl Into<String>, value: Value) {
        self.entries.push((stage.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn last(&self) -> Option<&Value> {
        self.entries.last().map(|(_, value)| value)
    }
}

/// One step of the pipeline, bound to one downstream agent
#[derive(Clone)]
pub struct Stage {
    name: String,
    sender: Arc<dyn TaskSender>,
    build: RequestBuilder,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        sender: Arc<dyn TaskSender>,
        build: RequestBuilder,
    ) -> Self {
        Self {
            name: name.into(),
            sender,
            build,
        }
    }

    /// Stage whose request is `{"query": ...}` alone.
    pub fn query_only(name: impl Into<String>, sender: Arc<dyn TaskSender>) -> Self {
        Self::with_inputs(name, sender, BTreeMap::new())
    }

    /// Stage whose request is `{"query": ..., <key>: <result of stage>, ...}`.
    ///
    /// Inputs naming a stage that has not produced a result are sent as `null`.
    pub fn with_inputs(
        name: impl Into<String>,
        sender: Arc<dyn TaskSender>,
        inputs: BTreeMap<String, String>,
    ) -> Self {
        let build: RequestBuilder = Arc::new(move |query: &str, outputs: &StageOutputs| {
            let mut request = Map::new();
            request.insert("query".to_string(), json!(query));
            for (key, source) in &inputs {
                let value = outputs.get(source).cloned().unwrap_or(Value::Null);
                request.insert(key.clone(), value);
            }
            Value::Object(request)
        });
        Self::new(name, sender, build)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        self.sender.target()
    }

    pub fn sender(&self) -> &Arc<dyn TaskSender> {
        &self.sender
    }

    pub fn build_request(&self, query: &str, outputs: &StageOutputs) -> Value {
        (self.build)(query, outputs)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("target", &self.sender.target())
            .finish()
    }
}
