//! Human-facing run summary.
//!
//! A clean run gets a one-line confirmation; a failed run gets the full
//! terminal payload (exit code, reasons, status) for diagnosis. The
//! captured container output is appended in both cases.

use ecsrun_runner::RunReport;

/// Render the summary printed after the run stops.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();

    if report.result.succeeded() {
        out.push_str("==> The one-off task finished successfully\n");
    } else {
        out.push_str("==> The one-off task failed\n");
        out.push_str(&format!("Last status: {}\n", report.result.last_status));
        out.push_str(&format!(
            "Container exit code: {}\n",
            match report.result.exit_code {
                Some(code) => code.to_string(),
                None => "none".to_string(),
            }
        ));
        out.push_str(&format!(
            "Container exit reason: {}\n",
            report.result.exit_reason.as_deref().unwrap_or("none")
        ));
        out.push_str(&format!(
            "Stopped reason: {}\n",
            report.result.stopped_reason.as_deref().unwrap_or("none")
        ));
    }

    match &report.output {
        Some(lines) if !lines.is_empty() => {
            out.push_str("Container output:\n");
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        _ => out.push_str("Container output: none\n"),
    }

    out
}

/// Print the summary to stdout.
pub fn print_report(report: &RunReport) {
    print!("{}", render_report(report));
}
