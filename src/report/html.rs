//! Self-contained HTML report (inline styles, no external assets)

use super::{group_digits, human_bytes, length_rows};
use crate::enumerate::StatsSnapshot;

pub(super) fn render(snapshot: &StatsSnapshot) -> String {
    let run = &snapshot.run;
    let totals = &snapshot.totals;

    let summary = [
        ("Output File", escape(&run.output.display().to_string())),
        ("Charset Size", run.charset_size.to_string()),
        ("Length Range", format!("{}..{}", run.min_len, run.max_len)),
        ("Started At", run.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Elapsed", format!("{:.1}s", run.elapsed.as_secs_f64())),
        ("File Size", human_bytes(run.file_size)),
        ("Total Attempts", group_digits(totals.attempts)),
        ("Total Success", group_digits(totals.written)),
        ("Total Failed", group_digits(totals.failed)),
        ("Write Rate", format!("{:.1} lines/sec", snapshot.write_rate())),
    ]
    .iter()
    .map(|(label, value)| format!("<tr><td><b>{}</b></td><td>{}</td></tr>", label, value))
    .collect::<Vec<_>>()
    .join("\n");

    let rows = length_rows(snapshot)
        .iter()
        .map(|row| {
            format!(
                r#"<tr>
  <td style="text-align:right;">{}</td>
  <td style="text-align:right;">{}</td>
  <td style="text-align:right;">{}</td>
  <td style="text-align:right;">{}</td>
  <td style="text-align:right;">{}</td>
  <td style="text-align:right;">{:.2}%</td>
</tr>"#,
                row.length, row.possible, row.existing, row.written, row.failed, row.percent
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!doctype html>
<html lang="en"><head>
<meta charset="utf-8">
<title>Generation Report</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body style="font-family: -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; padding: 20px;">
<h1>Generation Report</h1>
<table>
{summary}
</table>

<h2>Per-Length Progress</h2>
<table border="1" cellspacing="0" cellpadding="6">
<thead>
<tr style="background:#f4f4f4;">
  <th>Len</th><th>Possible</th><th>Existing/Done</th><th>New Written</th><th>Failed</th><th>Progress</th>
</tr>
</thead>
<tbody>
{rows}
</tbody>
</table>
<p style="color:#666;">Existing/Done = distinct entries of that length in the file, including the ones written this run.</p>
</body></html>"#
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
