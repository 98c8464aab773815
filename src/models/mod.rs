//! Data models for `pbsnodes` output.
//!
//! This module provides the node records decoded from the scheduler, their
//! classification into display states, and the configuration types.

mod config;
mod node;
mod pbs_responses;
mod state;

pub use config::{ConfigFile, DisplayConfig, DisplayFile, JobFilter, QfreeConfig, ReportOptions, SystemConfig};
pub use node::{
    DomainSuffixes, JobAllocation, NodeRecord, ParseError, parse_job_allocations, strip_domain_suffix,
};
pub use pbs_responses::{PbsNode, PbsNodesResponse, parse_node_status};
pub use state::{ClassifiedNode, DisplayState, NodeState, Totals};
