//! Plain-text report

use super::{group_digits, human_bytes, length_rows};
use crate::enumerate::StatsSnapshot;

pub(super) fn render(snapshot: &StatsSnapshot) -> String {
    let run = &snapshot.run;
    let totals = &snapshot.totals;
    let mut lines = vec![
        "=== GENERATION REPORT ===".to_string(),
        format!("Output File      : {}", run.output.display()),
        format!("Charset Size     : {}", run.charset_size),
        format!("Length Range     : {}..{}", run.min_len, run.max_len),
        format!("Started At       : {}", run.started_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Elapsed          : {:.1}s", run.elapsed.as_secs_f64()),
        format!("File Size        : {}", human_bytes(run.file_size)),
        String::new(),
        format!("Total Attempts   : {}", group_digits(totals.attempts)),
        format!("Total Success    : {}", group_digits(totals.written)),
        format!("Total Failed     : {}", group_digits(totals.failed)),
        format!("Write Rate       : {:.1} lines/sec", snapshot.write_rate()),
        String::new(),
        "Per-Length Progress:".to_string(),
        "Len | Possible           | Existing/Done      | New Written       | Failed           | Progress".to_string(),
        "----+--------------------+--------------------+-------------------+------------------+---------".to_string(),
    ];

    for row in length_rows(snapshot) {
        lines.push(format!(
            "{:>3} | {:>18} | {:>18} | {:>17} | {:>16} | {:6.2}%",
            row.length, row.possible, row.existing, row.written, row.failed, row.percent
        ));
    }

    lines.join("\n")
}
