//! Node records and job allocation decoding.
//!
//! A [`NodeRecord`] is one `<Node>` element of `pbsnodes -x` after validation.
//! The `<jobs>` text of a node lists which job holds each processor slot, e.g.
//! `0/1234.server, 1/1234.server, 2/1240.server`; [`parse_job_allocations`] turns
//! it into [`JobAllocation`]s grouped per job.

use thiserror::Error;

/// Errors raised while decoding `pbsnodes` output
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed pbsnodes XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("node #{index} is missing required field <{field}>")]
    MissingField { index: usize, field: &'static str },

    #[error("node {node}: invalid processor count '{value}'")]
    InvalidProcCount { node: String, value: String },

    #[error("malformed job allocation entry '{entry}': {reason}")]
    MalformedJobEntry { entry: String, reason: &'static str },
}

/// Domain suffixes stripped from node and job names for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSuffixes {
    pub node: String,
    pub job: String,
}

impl Default for DomainSuffixes {
    fn default() -> Self {
        Self {
            node: ".nucleares.unam.mx".to_string(),
            job: ".diable.nucleares.unam.mx".to_string(),
        }
    }
}

/// Strip a domain suffix from a host or job name.
///
/// An empty suffix leaves the name untouched.
pub fn strip_domain_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        name
    } else {
        name.strip_suffix(suffix).unwrap_or(name)
    }
}

/// Widest processor range accepted in a single allocation entry
pub const MAX_PROC_RANGE: usize = 1 << 16;

/// Processor slots held by one job on one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAllocation {
    pub job_id: String,
    /// Processor indices in the order they appear in the allocation text
    pub procs: Vec<usize>,
}

impl JobAllocation {
    #[must_use]
    pub fn proc_count(&self) -> usize {
        self.procs.len()
    }
}

/// A validated node from the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Host name with the node domain suffix removed
    pub name: String,
    /// Raw scheduler state, e.g. `free`, `job-exclusive` or `down,offline`
    pub state: String,
    /// Total processor slots (`np`)
    pub np: u32,
    pub jobs: Vec<JobAllocation>,
}

impl NodeRecord {
    /// Processor slots held by any job
    #[must_use]
    pub fn procs_used(&self) -> u32 {
        let used: usize = self.jobs.iter().map(JobAllocation::proc_count).sum();
        u32::try_from(used).unwrap_or(u32::MAX)
    }
}

/// Decode a `<jobs>` text into allocations grouped by job.
///
/// Jobs keep the order in which they first appear; processor indices keep
/// their order within each job. Index ranges such as `0-3/job` expand to every
/// index in the range. Any malformed entry fails the whole text.
pub fn parse_job_allocations(
    text: &str,
    job_suffix: &str,
) -> Result<Vec<JobAllocation>, ParseError> {
    let mut allocations: Vec<JobAllocation> = Vec::new();

    for entry in text.split(',').map(str::trim) {
        let malformed = |reason| ParseError::MalformedJobEntry {
            entry: entry.to_string(),
            reason,
        };

        let (procs, job) = entry
            .split_once('/')
            .ok_or_else(|| malformed("missing '/' separator"))?;

        let job_id = strip_domain_suffix(job.trim(), job_suffix);
        if job_id.is_empty() {
            return Err(malformed("empty job identifier"));
        }

        let indices = parse_proc_indices(procs.trim()).map_err(malformed)?;

        match allocations.iter_mut().find(|a| a.job_id == job_id) {
            Some(allocation) => allocation.procs.extend(indices),
            None => allocations.push(JobAllocation {
                job_id: job_id.to_string(),
                procs: indices,
            }),
        }
    }

    Ok(allocations)
}

/// Parse `7` or `0-3` into the listed processor indices
fn parse_proc_indices(range: &str) -> Result<Vec<usize>, &'static str> {
    const INVALID: &str = "invalid processor index";

    match range.split_once('-') {
        Some((start, end)) => {
            let start: usize = start.trim().parse().map_err(|_| INVALID)?;
            let end: usize = end.trim().parse().map_err(|_| INVALID)?;
            if start > end {
                return Err(INVALID);
            }
            if end - start >= MAX_PROC_RANGE {
                return Err("processor index out of range");
            }
            Ok((start..=end).collect())
        }
        None => range.parse().map(|index| vec![index]).map_err(|_| INVALID),
    }
}
