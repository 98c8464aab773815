//! Display and formatting functions for the processor report

use crate::formatting::{Cell, Color, Palette, format_row};
use crate::models::{ClassifiedNode, DisplayState, JobAllocation, JobFilter, NodeRecord, ReportOptions, Totals};

const HEADER: [&str; 3] = ["Node", "State", "Procs avail / total"];

/// Color used for a state and its available-processor count
fn state_color(state: &DisplayState) -> Option<Color> {
    match state {
        DisplayState::Free => Some(Color::Green),
        DisplayState::Avail => Some(Color::Yellow),
        DisplayState::Full => Some(Color::Red),
        DisplayState::Down(_) | DisplayState::Offline(_) => Some(Color::Black),
        DisplayState::Other(_) => None,
    }
}

/// Build the State and Procs cells for a node
fn node_cells(node: &ClassifiedNode) -> [Cell; 3] {
    let name = Cell::text(node.name.as_str());
    let state = match state_color(&node.state) {
        Some(color) => Cell::colored(node.state.as_str(), color),
        None => Cell::text(node.state.as_str()),
    };

    let procs = match (&node.state, state_color(&node.state)) {
        (s, Some(color)) if s.has_breakdown() => Cell::Joined(vec![
            Cell::colored(node.available.to_string(), color),
            Cell::text(format!(" / {}", node.total)),
        ]),
        (s, _) if s.is_unavailable() => Cell::empty(),
        _ => Cell::text(node.total.to_string()),
    };

    [name, state, procs]
}

/// Format the header row, bold as a whole
pub fn format_header(palette: &Palette) -> String {
    let cells = HEADER.map(Cell::text);
    palette.paint(&format_row(&cells, &Palette::new(false)), Color::Bold)
}

/// Format one node row
pub fn format_node(node: &ClassifiedNode, palette: &Palette) -> String {
    format_row(&node_cells(node), palette)
}

/// Format the per-job lines of a node that pass `filter`
pub fn format_jobs(jobs: &[JobAllocation], filter: &JobFilter, palette: &Palette) -> Vec<String> {
    jobs.iter()
        .filter(|job| filter.matches(&job.job_id))
        .map(|job| {
            format!(
                "  Job {}: {} procs in use",
                job.job_id,
                palette.paint(&job.proc_count().to_string(), Color::Bold)
            )
        })
        .collect()
}

/// Format the summary line
pub fn format_totals(totals: &Totals, palette: &Palette) -> String {
    format!(
        "Procs: {} free, {} in use, {} total",
        palette.paint(&totals.available.to_string(), Color::Green),
        palette.paint(&totals.used.to_string(), Color::Red),
        totals.total()
    )
}

/// Render the full report: header, node rows with optional job lines,
/// the job filter note and the totals line.
///
/// Down and offline nodes never count toward the totals and are listed only
/// with `show_all`.
pub fn format_report(records: &[NodeRecord], options: &ReportOptions) -> String {
    let palette = Palette::new(options.color);
    let mut lines = vec![format_header(&palette)];
    let mut totals = Totals::default();

    for record in records {
        let node = ClassifiedNode::classify(record);
        totals.add(&node);

        if node.state.is_unavailable() && !options.show_all {
            continue;
        }

        lines.push(format_node(&node, &palette));
        lines.extend(format_jobs(&record.jobs, &options.job_filter, &palette));
    }

    if let JobFilter::Only(job_id) = &options.job_filter {
        lines.push(format!("(Showing job {} only)", palette.paint(job_id, Color::Bold)));
    }

    lines.push(format_totals(&totals, &palette));
    lines.join("\n")
}
