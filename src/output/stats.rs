//! Console statistics for a finished crawl
//!
//! This module renders a [`RunSummary`] as the human-readable report printed
//! at the end of a run.

use crate::output::traits::RunSummary;
use std::time::Duration;

/// Formats the run summary as a console report
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let rule = "=================================================";

    out.push_str(&format!("{}\n", rule));
    out.push_str("Crawling Completed!\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("Root URL: {}\n", summary.root_url));
    out.push_str(&format!("Stopped: {}\n", summary.stop_reason));
    out.push_str(&format!("Total Pages Crawled: {}\n", summary.pages_crawled));
    out.push_str(&format!(
        "Total URLs Discovered: {}\n",
        summary.urls_discovered
    ));
    out.push_str(&format!("Duration: {}\n", format_duration(summary.duration)));

    let rate = if summary.duration.as_secs_f64() > 0.0 {
        summary.pages_crawled as f64 / summary.duration.as_secs_f64()
    } else {
        0.0
    };
    out.push_str(&format!("Rate: {:.2} pages/sec\n", rate));

    let tally = &summary.outcomes;
    if tally.total() > 0 {
        out.push_str("\nUnits by Outcome:\n");
        for (label, count) in tally.breakdown() {
            if count > 0 {
                out.push_str(&format!("  {}: {}\n", label, count));
            }
        }
    }

    if summary.forced_cancellation {
        out.push_str("\nWarning: some units were cancelled before finishing\n");
    }

    out.push_str(rule);
    out
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("{}", format_summary(summary));
}

/// Formats a duration as `1h 2m 3s`, `2m 3s` or `3.4s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
