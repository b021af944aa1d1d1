//! Textual materialization helpers shared by the series variants.
//!
//! The variants format their own rows (through the installed value
//! formatter) and hand the rendered strings here, so this module knows
//! nothing about native value types.

use tabled::builder::Builder;
use tabled::settings::{Alignment, Style};

/// Render a window of rows as a bordered table.
///
/// Layout: a header row with the series name, one record per row prefixed
/// with its index, and a footer with the `{rows}x1` shape and the data
/// type name.
pub(crate) fn series_table(
    name: &str,
    dtype: &str,
    total_rows: usize,
    window: &[(usize, String)],
) -> String {
    let mut builder = Builder::default();

    builder.push_record(["", name]);
    for (row, cell) in window {
        builder.push_record([format!("{row}:"), cell.clone()]);
    }
    builder.push_record([format!("{total_rows}x1"), dtype.to_string()]);

    let mut table = builder.build();
    table.with(Style::ascii());
    table.with(Alignment::center());
    table.to_string()
}

/// Render the series inline as `[ v0 v1 ... vN ]`.
///
/// Beyond six rows only the first and last three are shown, with an
/// ellipsis between them.
pub(crate) fn series_inline(total_rows: usize, fmt_row: impl Fn(usize) -> String) -> String {
    let mut out = String::from("[ ");

    if total_rows > 6 {
        for row in 0..3 {
            out.push_str(&fmt_row(row));
            out.push(' ');
        }
        out.push_str("... ");
        for row in total_rows - 3..total_rows {
            out.push_str(&fmt_row(row));
            out.push(' ');
        }
    } else {
        for row in 0..total_rows {
            out.push_str(&fmt_row(row));
            out.push(' ');
        }
    }

    out.push(']');
    out
}
