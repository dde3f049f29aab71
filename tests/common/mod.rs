//! In-memory fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use kubepick::kube::ResourceLister;
use kubepick::models::ResourceObject;
use kubepick::select::{SelectConfig, SelectError, Selector};
use serde_json::json;

/// Lister over a fixed set of objects, keyed by lower-case kind
#[derive(Default)]
pub struct StaticLister {
    objects: HashMap<String, Vec<ResourceObject>>,
    failing: HashMap<String, String>,
    cluster_scoped: HashSet<String>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: &str, object: ResourceObject) -> Self {
        self.objects
            .entry(kind.to_lowercase())
            .or_default()
            .push(object);
        self
    }

    /// Make every listing of `kind` fail with `message`
    pub fn failing(mut self, kind: &str, message: &str) -> Self {
        self.failing
            .insert(kind.to_lowercase(), message.to_string());
        self
    }

    /// Serve `object` as cluster-scoped: listing its kind ignores the namespace
    pub fn with_cluster(mut self, kind: &str, object: ResourceObject) -> Self {
        self.cluster_scoped.insert(kind.to_lowercase());
        self.with(kind, object)
    }

    /// `(kind, namespace)` of every list call so far
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceLister for StaticLister {
    async fn list(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> anyhow::Result<Vec<ResourceObject>> {
        self.calls
            .lock()
            .unwrap()
            .push((kind.to_string(), namespace.map(str::to_string)));

        let kind = kind.to_lowercase();
        if let Some(message) = self.failing.get(&kind) {
            return Err(anyhow::anyhow!("{}", message));
        }

        let namespace = if self.cluster_scoped.contains(&kind) {
            None
        } else {
            namespace
        };

        Ok(self
            .objects
            .get(&kind)
            .map(|objects| {
                objects
                    .iter()
                    .filter(|obj| namespace.is_none_or(|ns| obj.namespace == ns))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// One recorded selector invocation
#[derive(Debug, Clone)]
pub struct SelectCall {
    pub candidates: Vec<String>,
    pub config: SelectConfig,
}

/// Selector that replays scripted answers in order and records every call
#[derive(Default)]
pub struct ScriptedSelector {
    answers: Mutex<VecDeque<Result<Vec<String>, SelectError>>>,
    calls: Mutex<Vec<SelectCall>>,
}

impl ScriptedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choosing(self, choice: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Ok(vec![choice.to_string()]));
        self
    }

    pub fn failing(self, error: SelectError) -> Self {
        self.answers.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<SelectCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Selector for ScriptedSelector {
    async fn select(
        &self,
        candidates: &[String],
        config: &SelectConfig,
    ) -> Result<Vec<String>, SelectError> {
        self.calls.lock().unwrap().push(SelectCall {
            candidates: candidates.to_vec(),
            config: config.clone(),
        });
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SelectError::NoSelection))
    }
}

pub fn pod(name: &str, namespace: &str, labels: &[(&str, &str)]) -> ResourceObject {
    labels
        .iter()
        .fold(ResourceObject::new("Pod", name, namespace), |pod, (k, v)| {
            pod.with_label(*k, *v)
        })
}

/// A workload whose `spec.selector.matchLabels` is `labels`
pub fn workload(kind: &str, name: &str, namespace: &str, labels: &[(&str, &str)]) -> ResourceObject {
    let match_labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    ResourceObject::new(kind, name, namespace)
        .with_data(json!({"spec": {"selector": {"matchLabels": match_labels}}}))
}

/// A service whose `spec.selector` is `labels`
pub fn service(name: &str, namespace: &str, labels: &[(&str, &str)]) -> ResourceObject {
    let selector: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    ResourceObject::new("Service", name, namespace).with_data(json!({"spec": {"selector": selector}}))
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
