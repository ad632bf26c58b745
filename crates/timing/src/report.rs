//! Text reports over a timing tree.
//!
//! Two layouts are produced, both depth-first from the root with children in
//! creation order:
//!
//! ```text
//! -Total: 0.010000 CPU (0 times, 0.010000 wall, 0.010000 children, min: 0.000000 max: 0.000000)
//! | -solve: 0.010000 CPU (1 times, 0.010000 wall, 0.007000 children, min: 0.010000 max: 0.010000) 100.0%
//! | | -linearize: 0.007000 CPU (2 times, 0.007000 wall, 0.000000 children, min: 0.007000 max: 0.007000) 70.0%
//! ```
//!
//! and the mean/standard-deviation variant, which shows per-call mean and
//! spread instead of totals.

use crate::clock::Clock;
use crate::config::{ReportConfig, ReportSink};
use crate::error::TimingResult;
use crate::node::NodeId;
use crate::tree::TimingTree;
use std::io::Write;

const INDENT: &str = "| ";

fn seconds(us: u64) -> f64 {
    us as f64 / 1_000_000.0
}

fn display_label(label: &str, config: &ReportConfig) -> String {
    if config.underscores_as_spaces {
        label.replace('_', " ")
    } else {
        label.to_string()
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Write the totals outline for `node` and everything below it.
pub fn write_outline<C: Clock>(
    tree: &TimingTree<C>,
    node: NodeId,
    out: &mut impl Write,
    config: &ReportConfig,
) -> TimingResult<()> {
    outline_node(tree, node, "", None, out, config)
}

fn outline_node<C: Clock>(
    tree: &TimingTree<C>,
    id: NodeId,
    prefix: &str,
    parent_total: Option<u64>,
    out: &mut impl Write,
    config: &ReportConfig,
) -> TimingResult<()> {
    let node = &tree[id];
    let precision = config.precision;
    let total = tree.total_us(id);

    write!(
        out,
        "{prefix}-{}: {:.precision$} CPU ({} times, {:.precision$} wall, {:.precision$} children",
        display_label(node.label(), config),
        seconds(total),
        node.calls(),
        seconds(tree.total_wall_us(id)),
        seconds(tree.children_us(id)),
    )?;
    if config.show_min_max {
        write!(
            out,
            ", min: {:.precision$} max: {:.precision$}",
            seconds(node.min_us().unwrap_or(0)),
            seconds(node.max_us().unwrap_or(0)),
        )?;
    }
    write!(out, ")")?;
    if let Some(parent_total) = parent_total {
        write!(out, " {:.1}%", percent(total, parent_total))?;
    }
    writeln!(out)?;

    let child_prefix = format!("{prefix}{INDENT}");
    for child in tree.children(id) {
        outline_node(tree, child, &child_prefix, Some(total), out, config)?;
    }
    Ok(())
}

/// Write the mean/standard-deviation outline for `node` and everything
/// below it. `parent_total` (µs) is the reference for the top node's
/// percentage; pass `None` to omit it.
pub fn write_mean_std_dev<C: Clock>(
    tree: &TimingTree<C>,
    node: NodeId,
    parent_total: Option<u64>,
    out: &mut impl Write,
    config: &ReportConfig,
) -> TimingResult<()> {
    mean_std_dev_node(tree, node, "", parent_total, out, config)
}

fn mean_std_dev_node<C: Clock>(
    tree: &TimingTree<C>,
    id: NodeId,
    prefix: &str,
    parent_total: Option<u64>,
    out: &mut impl Write,
    config: &ReportConfig,
) -> TimingResult<()> {
    let node = &tree[id];
    let precision = config.precision;
    let total = tree.total_us(id);

    write!(
        out,
        "{prefix}-{}: {} calls, mean {:.precision$}, std dev {:.precision$}",
        display_label(node.label(), config),
        node.calls(),
        node.mean_us() / 1_000_000.0,
        node.std_dev_us() / 1_000_000.0,
    )?;
    if let Some(parent_total) = parent_total {
        write!(out, " ({:.1}%)", percent(total, parent_total))?;
    }
    writeln!(out)?;

    let child_prefix = format!("{prefix}{INDENT}");
    for child in tree.children(id) {
        mean_std_dev_node(tree, child, &child_prefix, Some(total), out, config)?;
    }
    Ok(())
}

/// Send a rendered report to a configured sink.
pub(crate) fn emit(report: &str, sink: ReportSink) -> TimingResult<()> {
    match sink {
        ReportSink::Stdout => std::io::stdout().lock().write_all(report.as_bytes())?,
        ReportSink::Stderr => std::io::stderr().lock().write_all(report.as_bytes())?,
        ReportSink::Log => {
            for line in report.lines() {
                tracing::info!(target: "timing::report", "{}", line);
            }
        }
    }
    Ok(())
}

impl<C: Clock> TimingTree<C> {
    /// Render the totals outline of the whole tree.
    pub fn outline(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = write_outline(self, self.root(), &mut buf, &self.config().report);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Render the mean/standard-deviation outline of the whole tree.
    pub fn mean_std_dev_outline(&self) -> String {
        let mut buf = Vec::new();
        let _ = write_mean_std_dev(self, self.root(), None, &mut buf, &self.config().report);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the totals outline to `out`.
    pub fn print_to(&self, out: &mut impl Write) -> TimingResult<()> {
        write_outline(self, self.root(), out, &self.config().report)
    }

    /// Write the mean/standard-deviation outline to `out`.
    pub fn print_mean_std_dev_to(&self, out: &mut impl Write) -> TimingResult<()> {
        write_mean_std_dev(self, self.root(), None, out, &self.config().report)
    }

    /// Print the totals outline to the configured sink.
    pub fn print(&self) -> TimingResult<()> {
        emit(&self.outline(), self.config().report.sink)
    }

    /// Print the mean/standard-deviation outline to the configured sink.
    pub fn print_mean_std_dev(&self) -> TimingResult<()> {
        emit(&self.mean_std_dev_outline(), self.config().report.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::TimingConfig;
    use crate::registry::global_registry;

    fn sample() -> TimingTree<ManualClock> {
        let registry = global_registry();
        let clock = ManualClock::new();
        let mut tree = TimingTree::with_clock(clock.clone());
        let (solve, step_one) = (registry.id_for("solve"), registry.id_for("step_one"));

        tree.tic(solve, "solve");
        for us in [2_000, 4_000] {
            tree.tic(step_one, "step_one");
            clock.advance_both(us);
            tree.toc(step_one, "step_one").unwrap();
        }
        clock.advance_both(4_000);
        tree.toc(solve, "solve").unwrap();
        tree.finish_iteration();
        tree
    }

    #[test]
    fn test_outline_layout() {
        let tree = sample();
        let outline = tree.outline();
        let lines: Vec<&str> = outline.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("-Total: 0.010000 CPU (0 times"));
        assert_eq!(
            lines[1],
            "| -solve: 0.010000 CPU (1 times, 0.010000 wall, 0.006000 children, min: 0.010000 max: 0.010000) 100.0%"
        );
        assert_eq!(
            lines[2],
            "| | -step one: 0.006000 CPU (2 times, 0.006000 wall, 0.000000 children, min: 0.006000 max: 0.006000) 60.0%"
        );
    }

    #[test]
    fn test_mean_std_dev_layout() {
        let tree = sample();
        let outline = tree.mean_std_dev_outline();
        let lines: Vec<&str> = outline.lines().collect();

        assert_eq!(lines[0], "-Total: 0 calls, mean 0.000000, std dev 0.000000");
        assert_eq!(lines[1], "| -solve: 1 calls, mean 0.010000, std dev 0.000000 (100.0%)");
        assert_eq!(lines[2], "| | -step one: 2 calls, mean 0.003000, std dev 0.001000 (60.0%)");
    }

    #[test]
    fn test_report_options() {
        let mut tree = sample();
        let report = ReportConfig {
            precision: 3,
            show_min_max: false,
            underscores_as_spaces: false,
            ..ReportConfig::default()
        };
        tree.set_config(TimingConfig::default().with_report(report));

        let outline = tree.outline();
        assert!(outline.contains("-step_one: 0.006 CPU (2 times, 0.006 wall, 0.000 children) 60.0%"));
        assert!(!outline.contains("min:"));
    }

    #[test]
    fn test_reports_do_not_mutate() {
        let tree = sample();
        let before = tree.outline();
        let _ = tree.mean_std_dev_outline();
        assert_eq!(tree.outline(), before);
    }

    #[test]
    fn test_print_to_writer() {
        let tree = sample();
        let mut buf = Vec::new();
        tree.print_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), tree.outline());
    }

    #[test]
    fn test_write_mean_std_dev_with_reference_total() {
        let tree = sample();
        let solve = tree.find(&["solve"]).unwrap();
        let mut buf = Vec::new();
        write_mean_std_dev(&tree, solve, Some(20_000), &mut buf, &ReportConfig::default()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("-solve: 1 calls, mean 0.010000, std dev 0.000000 (50.0%)"));
    }

    #[test]
    fn test_percent_of_zero_total() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
