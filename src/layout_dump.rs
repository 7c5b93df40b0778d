use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::{Value, json};

use crate::ir::ClusterId;
use crate::layout::{ClusterLayout, Layout};
use crate::order::SolveStatus;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub status: SolveStatus,
    pub objective: f64,
    pub clusters: Vec<ClusterLayout>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        LayoutDump {
            width: layout.width,
            height: layout.height,
            status: layout.status,
            objective: layout.objective,
            clusters: layout.clusters.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}

/// Writes `x`, `y`, `dx`, `dy` and `depth` into every group of a parsed
/// node-link document.
pub fn annotate_groups(
    document: &mut Value,
    group_slots: &[(ClusterId, usize)],
    layout: &Layout,
) -> Result<()> {
    let by_cluster: HashMap<ClusterId, &ClusterLayout> = layout
        .clusters
        .iter()
        .map(|entry| (entry.cluster, entry))
        .collect();
    let groups = document
        .get_mut("groups")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("document has no \"groups\" array"))?;
    for &(cluster, slot) in group_slots {
        let entry = by_cluster
            .get(&cluster)
            .ok_or_else(|| anyhow!("no rectangle was computed for group {cluster}"))?;
        let group = groups
            .get_mut(slot)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| anyhow!("group #{slot} is not an object"))?;
        group.insert("x".to_string(), json!(entry.x));
        group.insert("y".to_string(), json!(entry.y));
        group.insert("dx".to_string(), json!(entry.width));
        group.insert("dy".to_string(), json!(entry.height));
        group.insert("depth".to_string(), json!(entry.depth));
    }
    Ok(())
}

/// Pretty-prints `document` to `path`, or to stdout when no path is given.
pub fn write_document(document: &Value, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, document)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
