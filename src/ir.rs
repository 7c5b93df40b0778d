/// Cluster identifiers as they appear in the input hierarchy. They need not be
/// contiguous.
pub type ClusterId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub cluster: ClusterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// One entry of the cluster forest. Exactly one cluster has no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterSpec {
    pub id: ClusterId,
    pub parent: Option<ClusterId>,
}

/// Undirected graph whose nodes carry a cluster assignment, plus the cluster
/// hierarchy the treemap nests by.
#[derive(Debug, Clone, Default)]
pub struct GroupedGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<ClusterSpec>,
}

impl GroupedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cluster(&mut self, id: ClusterId, parent: Option<ClusterId>) {
        self.clusters.push(ClusterSpec { id, parent });
    }

    pub fn add_node(&mut self, id: impl Into<String>, cluster: ClusterId) {
        self.nodes.push(GraphNode {
            id: id.into(),
            cluster,
        });
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
        });
    }

    /// Adds `count` anonymous member nodes to `cluster`, named `{prefix}{n}`.
    pub fn add_members(&mut self, cluster: ClusterId, prefix: &str, count: usize) {
        for n in 0..count {
            self.add_node(format!("{prefix}{n}"), cluster);
        }
    }
}
