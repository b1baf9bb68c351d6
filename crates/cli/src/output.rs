use crate::error::CliError;
use engine_runtime::execution::summary::{ImportSummary, RunPath};
use serde_json::json;

fn summary_json(summary: &ImportSummary) -> serde_json::Value {
    let path = match summary.path {
        RunPath::Completed => "completed",
        RunPath::Interrupted => "interrupted",
    };
    json!({
        "path": path,
        "head": summary.head,
        "headers_sent": summary.reader.headers_sent,
        "batches_sent": summary.reader.batches_sent,
        "headers_committed": summary.metrics.headers_committed(),
        "batches_committed": summary.metrics.batches(),
        "validation_ms": summary.metrics.total_validation().as_millis() as u64,
        "write_ms": summary.metrics.total_write().as_millis() as u64,
        "elapsed_ms": summary.elapsed.as_millis() as u64,
        "report": summary.report.as_ref().map(|p| p.display().to_string()),
    })
}

pub fn print_summary(summary: &ImportSummary, as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json = serde_json::to_string_pretty(&summary_json(summary))?;
        println!("{json}");
        return Ok(());
    }

    let report = summary
        .report
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "n/a".to_string());

    println!("Header import {:?}:", summary.path);
    println!("-----------------------------");
    println!("{:<18} {}", "Head", summary.head);
    println!("{:<18} {}", "Headers committed", summary.metrics.headers_committed());
    println!("{:<18} {}", "Batches", summary.metrics.batches());
    println!("{:<18} {:?}", "Validation", summary.metrics.total_validation());
    println!("{:<18} {:?}", "Write", summary.metrics.total_write());
    println!("{:<18} {:?}", "Elapsed", summary.elapsed);
    println!("{:<18} {}", "Report", report);
    Ok(())
}
