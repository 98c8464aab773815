//! qfree - per-node processor availability for PBS/Torque clusters
//!
//! The pipeline is linear: [`pbs::PbsInterface`] runs `pbsnodes -x`,
//! [`models::parse_node_status`] decodes the XML into node records, and
//! [`display::format_report`] classifies and renders them.

pub mod display;
pub mod formatting;
pub mod models;
pub mod pbs;
