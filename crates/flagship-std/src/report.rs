// SPDX-License-Identifier: MIT

//! Human-readable summaries of a registry snapshot.
//!
//! No table crate is pulled in for this; the renderer is a few lines of
//! fixed-width padding and stays dependency-free.

use flagship_core::{FeatureFlags, FlagState};

const HEADERS: [&str; 3] = ["name", "enabled", "description"];

/// Render a snapshot as an aligned three-column text table.
///
/// Rows appear in snapshot order, which is declaration order for snapshots
/// taken with [`FeatureFlags::state`].  The output ends with a newline so
/// it can be printed or logged as-is.
///
/// # Example
///
/// ```rust
/// use flagship_core::{Config, FeatureFlags, Flag};
/// use flagship_std::report;
///
/// let features = FeatureFlags::wrap(
///     Config::new()
///         .flag("checkout_v2", Flag::new("the redesigned checkout funnel").enabled(true))
///         .flag("beta_search", Flag::new("search rewrite").enabled(false)),
/// )
/// .unwrap();
///
/// let table = report::summary(&features.state());
/// assert!(table.contains("checkout_v2"));
/// assert!(table.contains("true"));
/// ```
pub fn summary(rows: &[FlagState]) -> String {
    let mut widths = [HEADERS[0].len(), HEADERS[1].len(), HEADERS[2].len()];
    for row in rows {
        widths[0] = widths[0].max(row.name.len());
        widths[1] = widths[1].max(enabled_label(row.enabled).len());
        widths[2] = widths[2].max(row.description.len());
    }

    let mut table = String::new();
    push_row(&mut table, &widths, HEADERS[0], HEADERS[1], HEADERS[2]);
    table.push_str(&format!(
        "{}  {}  {}\n",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2]),
    ));
    for row in rows {
        push_row(
            &mut table,
            &widths,
            &row.name,
            enabled_label(row.enabled),
            &row.description,
        );
    }
    table
}

/// Convenience wrapper: snapshot the registry and render it.
pub fn summary_of(features: &FeatureFlags) -> String {
    summary(&features.state())
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}

fn push_row(table: &mut String, widths: &[usize; 3], name: &str, enabled: &str, description: &str) {
    table.push_str(&format!(
        "{name:<w0$}  {enabled:<w1$}  {description}\n",
        w0 = widths[0],
        w1 = widths[1],
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagship_core::{Config, Flag};

    fn fixture() -> FeatureFlags {
        FeatureFlags::wrap(
            Config::new()
                .flag(
                    "dynamic_contact_form",
                    Flag::new("fills in contact details from the session").enabled(true),
                )
                .flag("beta_search", Flag::new("search rewrite").enabled(false)),
        )
        .unwrap()
    }

    #[test]
    fn every_flag_appears_with_its_resolved_value() {
        let table = summary_of(&fixture());

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("name"));
        assert!(lines[1].starts_with("----"));
        assert!(lines[2].contains("dynamic_contact_form"));
        assert!(lines[2].contains("true"));
        assert!(lines[3].contains("beta_search"));
        assert!(lines[3].contains("false"));
    }

    #[test]
    fn columns_line_up_across_rows() {
        let table = summary_of(&fixture());

        // Every row places the enabled column at the same offset, two
        // spaces past the widest name.
        let offset = "dynamic_contact_form".len() + 2;
        for line in table.lines() {
            assert!(line.len() > offset);
            assert_ne!(line.as_bytes()[offset], b' ');
        }
    }

    #[test]
    fn an_empty_snapshot_is_just_the_header() {
        let table = summary(&[]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("name"));
        assert!(lines[0].contains("enabled"));
        assert!(lines[0].contains("description"));
    }

    #[test]
    fn descriptions_keep_their_text_untruncated() {
        let table = summary_of(&fixture());
        assert!(table.contains("fills in contact details from the session"));
    }
}
