use serde::Deserialize;

/// Top-level plan file layout shared by the TOML and JSON loaders.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub plan: NodeConfig,
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub sender: SenderSection,
}

/// Optional `[run]` section; every field can be overridden from the CLI.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub threads: Option<usize>,
    pub iterations: Option<u64>,
    pub duration_ms: Option<u64>,
    pub seed: Option<u64>,
    pub host: Option<String>,
}

/// Optional `[sender]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SenderSection {
    /// Textual policy, e.g. `immediate`, `hold` or `batch(50, 1000)`.
    pub policy: Option<String>,
}

/// One node of the plan tree as written in a plan file.
///
/// Controllers carry nested `children`; the `delay` sampler is a leaf.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum NodeConfig {
    Generic {
        name: Option<String>,
        #[serde(default)]
        children: Vec<NodeConfig>,
    },
    Loop {
        name: Option<String>,
        /// Number of passes over the children; omit for an unbounded loop.
        loops: Option<u64>,
        #[serde(default)]
        children: Vec<NodeConfig>,
    },
    RandomOrder {
        name: Option<String>,
        #[serde(default)]
        children: Vec<NodeConfig>,
    },
    Transaction {
        name: Option<String>,
        #[serde(default)]
        children: Vec<NodeConfig>,
    },
    Delay {
        label: Option<String>,
        #[serde(default)]
        delay_ms: u64,
        /// Fail every Nth execution of this sampler.
        fail_every: Option<u64>,
    },
}
