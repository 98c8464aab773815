//! Node state classification and processor totals.

use super::node::NodeRecord;

/// Scheduler state of a node, reduced to what the report distinguishes.
///
/// PBS reports composite states such as `down,offline` or `job-exclusive,busy`.
/// `offline` takes precedence over `down`; otherwise the first token decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Free,
    JobExclusive,
    Down,
    Offline,
    Other(String),
}

impl NodeState {
    #[must_use]
    pub fn from_pbs(raw: &str) -> Self {
        let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();

        if tokens.contains(&"offline") {
            NodeState::Offline
        } else if tokens.contains(&"down") {
            NodeState::Down
        } else {
            match tokens.first().copied() {
                Some("free") => NodeState::Free,
                Some("job-exclusive") => NodeState::JobExclusive,
                _ => NodeState::Other(raw.trim().to_string()),
            }
        }
    }

    /// Down and offline nodes accept no work
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, NodeState::Down | NodeState::Offline)
    }
}

/// State shown in the report's State column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// All processors available
    Free,
    /// Some processors available
    Avail,
    /// No processors available
    Full,
    /// Down node, holding the scheduler's state text as reported
    Down(String),
    /// Offline node, holding the scheduler's state text as reported
    Offline(String),
    /// Unrecognized scheduler state, shown verbatim
    Other(String),
}

impl DisplayState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DisplayState::Free => "free",
            DisplayState::Avail => "avail",
            DisplayState::Full => "full",
            DisplayState::Down(raw) | DisplayState::Offline(raw) | DisplayState::Other(raw) => raw,
        }
    }

    /// Free, avail and full carry a used/available breakdown
    #[must_use]
    pub fn has_breakdown(&self) -> bool {
        matches!(self, DisplayState::Free | DisplayState::Avail | DisplayState::Full)
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DisplayState::Down(_) | DisplayState::Offline(_))
    }
}

impl std::fmt::Display for DisplayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node with its processor usage worked out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNode {
    pub name: String,
    pub state: DisplayState,
    pub used: u32,
    pub available: u32,
    pub total: u32,
}

impl ClassifiedNode {
    #[must_use]
    pub fn classify(record: &NodeRecord) -> Self {
        let total = record.np;
        let mut used = record.procs_used();

        if used > total {
            tracing::warn!(
                node = %record.name,
                used,
                total,
                "more processors allocated than the node reports, treating as full"
            );
            used = total;
        }

        let available = total - used;

        let state = match NodeState::from_pbs(&record.state) {
            NodeState::Down => DisplayState::Down(record.state.trim().to_string()),
            NodeState::Offline => DisplayState::Offline(record.state.trim().to_string()),
            NodeState::Free | NodeState::JobExclusive => {
                if used == 0 {
                    DisplayState::Free
                } else if used < total {
                    DisplayState::Avail
                } else {
                    DisplayState::Full
                }
            }
            NodeState::Other(raw) => DisplayState::Other(raw),
        };

        Self {
            name: record.name.clone(),
            state,
            used,
            available,
            total,
        }
    }

    /// Whether the node's processors are added to the cluster totals
    #[must_use]
    pub fn counts_toward_totals(&self) -> bool {
        !self.state.is_unavailable()
    }
}

/// Processor sums across all nodes that accept work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub available: u64,
    pub used: u64,
}

impl Totals {
    pub fn add(&mut self, node: &ClassifiedNode) {
        if node.counts_toward_totals() {
            self.available += u64::from(node.available);
            self.used += u64::from(node.used);
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.available + self.used
    }
}

impl<'a> FromIterator<&'a ClassifiedNode> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedNode>>(iter: I) -> Self {
        let mut totals = Totals::default();
        for node in iter {
            totals.add(node);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::parse_job_allocations;

    fn node(state: &str, np: u32, jobs: &str) -> NodeRecord {
        NodeRecord {
            name: "node01".to_string(),
            state: state.to_string(),
            np,
            jobs: if jobs.is_empty() {
                Vec::new()
            } else {
                parse_job_allocations(jobs, "").unwrap()
            },
        }
    }

    #[test]
    fn test_node_state_from_pbs() {
        assert_eq!(NodeState::from_pbs("free"), NodeState::Free);
        assert_eq!(NodeState::from_pbs("job-exclusive"), NodeState::JobExclusive);
        assert_eq!(NodeState::from_pbs("job-exclusive,busy"), NodeState::JobExclusive);
        assert_eq!(NodeState::from_pbs("down"), NodeState::Down);
        assert_eq!(NodeState::from_pbs("state-unknown,down"), NodeState::Down);
        assert_eq!(NodeState::from_pbs("down,offline"), NodeState::Offline);
        assert_eq!(NodeState::from_pbs("offline"), NodeState::Offline);
        assert_eq!(NodeState::from_pbs("reserve"), NodeState::Other("reserve".to_string()));
    }

    #[test]
    fn test_classify_free() {
        let classified = ClassifiedNode::classify(&node("free", 4, ""));
        assert_eq!(classified.state, DisplayState::Free);
        assert_eq!((classified.used, classified.available, classified.total), (0, 4, 4));
    }

    #[test]
    fn test_classify_avail() {
        let classified = ClassifiedNode::classify(&node("free", 8, "0/job1, 1/job1, 2/job2"));
        assert_eq!(classified.state, DisplayState::Avail);
        assert_eq!(classified.used, 3);
        assert_eq!(classified.available, 5);
    }

    #[test]
    fn test_classify_full() {
        let classified = ClassifiedNode::classify(&node("job-exclusive", 2, "0/a, 1/b"));
        assert_eq!(classified.state, DisplayState::Full);
        assert_eq!(classified.available, 0);
    }

    #[test]
    fn test_classify_job_exclusive_without_jobs_is_free() {
        let classified = ClassifiedNode::classify(&node("job-exclusive", 4, ""));
        assert_eq!(classified.state, DisplayState::Free);
    }

    #[test]
    fn test_classify_overallocated_is_full() {
        let classified = ClassifiedNode::classify(&node("job-exclusive", 1, "0/a, 1/a"));
        assert_eq!(classified.state, DisplayState::Full);
        assert_eq!(classified.used, 1);
        assert_eq!(classified.available, 0);
    }

    #[test]
    fn test_used_plus_available_is_total() {
        for (state, np, jobs) in [
            ("free", 8, ""),
            ("free", 8, "0/a"),
            ("job-exclusive", 8, "0-7/a"),
            ("job-exclusive", 16, "0/a, 3/b, 4/b"),
        ] {
            let classified = ClassifiedNode::classify(&node(state, np, jobs));
            assert_eq!(classified.used + classified.available, classified.total);
        }
    }

    #[test]
    fn test_classify_down_and_offline_keep_raw_state() {
        assert_eq!(
            ClassifiedNode::classify(&node("down", 4, "")).state,
            DisplayState::Down("down".to_string())
        );
        assert_eq!(
            ClassifiedNode::classify(&node("offline", 4, "0/a")).state,
            DisplayState::Offline("offline".to_string())
        );

        let composite = ClassifiedNode::classify(&node("down,offline", 4, ""));
        assert_eq!(composite.state, DisplayState::Offline("down,offline".to_string()));
        assert_eq!(composite.state.as_str(), "down,offline");
        assert!(!composite.counts_toward_totals());

        let unknown = ClassifiedNode::classify(&node("state-unknown,down", 4, ""));
        assert_eq!(unknown.state.as_str(), "state-unknown,down");
        assert!(unknown.state.is_unavailable());
    }

    #[test]
    fn test_classify_other_state_passes_through() {
        let classified = ClassifiedNode::classify(&node("reserve", 4, "0/a"));
        assert_eq!(classified.state, DisplayState::Other("reserve".to_string()));
        assert!(!classified.state.has_breakdown());
        assert!(classified.counts_toward_totals());
    }

    #[test]
    fn test_totals_skip_down_and_offline() {
        let nodes: Vec<ClassifiedNode> = [
            node("free", 4, ""),
            node("job-exclusive", 4, "0-3/a"),
            node("down", 16, ""),
            node("offline", 16, "0/b"),
        ]
        .iter()
        .map(ClassifiedNode::classify)
        .collect();

        let totals: Totals = nodes.iter().collect();
        assert_eq!(totals.available, 4);
        assert_eq!(totals.used, 4);
        assert_eq!(totals.total(), 8);
    }

    #[test]
    fn test_totals_include_passthrough_states() {
        let nodes = [ClassifiedNode::classify(&node("reserve", 4, "0/a"))];
        let totals: Totals = nodes.iter().collect();
        assert_eq!(totals, Totals { available: 3, used: 1 });
    }
}
