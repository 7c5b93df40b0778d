//! Reads grouped graphs from node-link JSON:
//!
//! ```json
//! { "nodes": [{"id": "a", "group": 1}],
//!   "links": [{"source": "a", "target": "b"}],
//!   "groups": [{"parent": null}, {"parent": 0}] }
//! ```
//!
//! A group's id is its `id` field, or its position in `groups` when absent.
//! Without `groups`, every group referenced by a node hangs off a synthetic
//! root that is added to the document.

use std::collections::BTreeSet;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value, json};

use crate::ir::{ClusterId, GroupedGraph};

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub graph: GroupedGraph,
    /// The input document; `groups` is always present after parsing.
    pub document: Value,
    /// `(cluster, index into document["groups"])` per cluster.
    pub group_slots: Vec<(ClusterId, usize)>,
    pub synthetic_root: Option<ClusterId>,
}

pub fn parse_node_link(input: &str, group_key: &str) -> Result<ParseOutput> {
    let document: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(json_err) => json5::from_str(input).map_err(|_| json_err)?,
    };
    parse_document(document, group_key)
}

pub fn parse_document(mut document: Value, group_key: &str) -> Result<ParseOutput> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| anyhow!("expected a JSON object at the top level"))?;

    let mut graph = GroupedGraph::new();
    let nodes = root
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("missing \"nodes\" array"))?;
    for (index, node) in nodes.iter().enumerate() {
        let id = match node.get("id") {
            Some(value) => node_id(value).with_context(|| format!("node #{index}"))?,
            None => index.to_string(),
        };
        let group = node
            .get(group_key)
            .ok_or_else(|| anyhow!("node {id} has no \"{group_key}\" field"))?;
        let group = group_id(group).with_context(|| format!("group of node {id}"))?;
        graph.add_node(id, group);
    }

    let links = root
        .get("links")
        .or_else(|| root.get("edges"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (index, link) in links.iter().enumerate() {
        let endpoint = |key: &str| -> Result<String> {
            let value = link
                .get(key)
                .ok_or_else(|| anyhow!("link #{index} has no \"{key}\""))?;
            node_id(value).with_context(|| format!("link #{index}"))
        };
        let source = endpoint("source")?;
        let target = endpoint("target")?;
        graph.add_edge(source, target);
    }

    let mut synthetic_root = None;
    if !root.contains_key("groups") {
        let referenced: BTreeSet<ClusterId> = graph.nodes.iter().map(|node| node.cluster).collect();
        let root_id = referenced.last().map_or(0, |last| last + 1);
        let mut groups: Vec<Value> = referenced
            .iter()
            .map(|id| json!({ "id": id, "parent": root_id }))
            .collect();
        groups.push(json!({ "id": root_id, "parent": null }));
        root.insert("groups".to_string(), Value::Array(groups));
        synthetic_root = Some(root_id);
    }

    let groups = root
        .get("groups")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("\"groups\" must be an array"))?;
    let mut group_slots = Vec::with_capacity(groups.len());
    for (index, group) in groups.iter().enumerate() {
        let fields: &Map<String, Value> = group
            .as_object()
            .ok_or_else(|| anyhow!("group #{index} is not an object"))?;
        let id = match fields.get("id") {
            Some(value) => group_id(value).with_context(|| format!("group #{index}"))?,
            None => index,
        };
        let parent = match fields.get("parent") {
            None | Some(Value::Null) => None,
            Some(value) => Some(group_id(value).with_context(|| format!("parent of group {id}"))?),
        };
        graph.add_cluster(id, parent);
        group_slots.push((id, index));
    }

    Ok(ParseOutput {
        graph,
        document,
        group_slots,
        synthetic_root,
    })
}

fn node_id(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => bail!("node id must be a string or a number, got {other}"),
    }
}

fn group_id(value: &Value) -> Result<ClusterId> {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|id| *id >= 0.0 && id.fract() == 0.0)
                .map(|id| id as u64)
        })
        .and_then(|id| ClusterId::try_from(id).ok())
        .ok_or_else(|| anyhow!("group id must be a non-negative integer, got {value}"))
}
