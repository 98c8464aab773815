//! `pbsnodes -x` response wrapper.
//!
//! The expected document is a `<Data>` root holding one `<Node>` element per
//! host. Each node must carry `<name>`, `<state>` and `<np>`; `<jobs>` is present
//! only when processors are allocated. Other elements are ignored.

use serde::Deserialize;

use super::node::{DomainSuffixes, NodeRecord, ParseError, parse_job_allocations, strip_domain_suffix};

/// Root of the `pbsnodes -x` document
#[derive(Debug, Deserialize)]
pub struct PbsNodesResponse {
    #[serde(rename = "Node", default)]
    pub nodes: Vec<PbsNode>,
}

/// One `<Node>` element as emitted by the scheduler.
///
/// Fields are optional here so that a missing element is reported as
/// [`ParseError::MissingField`] rather than a generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct PbsNode {
    pub name: Option<String>,
    pub state: Option<String>,
    pub np: Option<String>,
    pub jobs: Option<String>,
}

impl PbsNode {
    /// Validate the raw element and decode its job allocations.
    pub fn into_record(self, index: usize, suffixes: &DomainSuffixes) -> Result<NodeRecord, ParseError> {
        let missing = |field| ParseError::MissingField { index, field };

        let name = self.name.ok_or_else(|| missing("name"))?;
        let name = strip_domain_suffix(name.trim(), &suffixes.node).to_string();
        let state = self.state.ok_or_else(|| missing("state"))?;
        let np_text = self.np.ok_or_else(|| missing("np"))?;

        let np = np_text.trim().parse().map_err(|_| ParseError::InvalidProcCount {
            node: name.clone(),
            value: np_text.clone(),
        })?;

        let jobs = match self.jobs.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => parse_job_allocations(text, &suffixes.job)?,
            _ => Vec::new(),
        };

        Ok(NodeRecord {
            name,
            state: state.trim().to_string(),
            np,
            jobs,
        })
    }
}

/// Parse `pbsnodes -x` output into validated node records.
///
/// The first malformed node aborts parsing; no partial result is returned.
pub fn parse_node_status(xml: &str, suffixes: &DomainSuffixes) -> Result<Vec<NodeRecord>, ParseError> {
    let response: PbsNodesResponse = quick_xml::de::from_str(xml)?;
    tracing::debug!(nodes = response.nodes.len(), "parsed pbsnodes document");

    response
        .nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| node.into_record(index, suffixes))
        .collect()
}
