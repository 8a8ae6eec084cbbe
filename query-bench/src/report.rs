//! Report module: prints the cold/warm averages of a finished run.

use crate::aggregate::AggregateResult;

/// Render the report as printed to stdout.
pub fn render_report(result: &AggregateResult) -> String {
    match (result.cold_avg_ms(), result.warm_avg_ms()) {
        (Some(cold), Some(warm)) => format!(
            "avg of 'cold' {count} queries (ms): {cold:8.2}\n\
             avg of 'warm' {count} queries (ms): {warm:8.2}\n",
            count = result.count,
        ),
        _ => "no queries were run: no latency data to report\n".to_string(),
    }
}

pub fn print_report(result: &AggregateResult) {
    print!("{}", render_report(result));
}
