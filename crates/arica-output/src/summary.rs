//! Plain-text reporting of regression results.

use crate::export::RegressionSummaryRow;

/// Render the per-horizon regression summary as a fixed-width table.
///
/// Intended for terminal display at the end of a study run.
pub fn regression_table(rows: &[RegressionSummaryRow]) -> String {
    let mut output = String::new();

    output.push_str("\nCAR vs. Earnings Surprise\n");
    output.push_str(&"=".repeat(72));
    output.push('\n');

    output.push_str(&format!(
        "{:>8} {:>12} {:>10} {:>10} {:>10} {:>6}\n",
        "Window", "Coefficient", "StdError", "t-stat", "p-value", "N"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:>7}d {:>12.4} {:>10.4} {:>10.2} {:>10.4} {:>6}\n",
            row.window, row.coefficient, row.std_error, row.t_stat, row.p_value, row.n
        ));
    }

    output.push_str(&"-".repeat(72));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "R-squared ({}d): {:.4}\n",
            row.window, row.r_squared
        ));
    }

    output
}
