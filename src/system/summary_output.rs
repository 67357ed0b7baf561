use loadgen::metrics::{Bucket, LatencySummary};

const HEADERS: [&str; 7] = [
    "Total:", "OK:", "400:", "500:", "NetErr:", "Fastest:", "Slowest:",
];
const COLUMN_GAP: usize = 2;

/// Header row and value row of the run summary, padded into fixed columns.
pub(crate) fn summary_lines(summary: &LatencySummary) -> [String; 2] {
    let values = [
        bucket_cell(&summary.overall),
        bucket_cell(&summary.success),
        bucket_cell(&summary.client_error),
        bucket_cell(&summary.server_error),
        bucket_cell(&summary.network_error),
        format!("{}ms", summary.fastest_ms()),
        format!("{}ms", summary.slowest_ms()),
    ];

    let widths: Vec<usize> = HEADERS
        .iter()
        .zip(values.iter())
        .map(|(header, value)| header.len().max(value.len()).saturating_add(COLUMN_GAP))
        .collect();
    let header_line = pad_row(HEADERS.iter().copied(), &widths);
    let value_line = pad_row(values.iter().map(String::as_str), &widths);

    [
        header_line.trim_end().to_owned(),
        value_line.trim_end().to_owned(),
    ]
}

fn pad_row<'cell>(cells: impl Iterator<Item = &'cell str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect()
}

fn bucket_cell(bucket: &Bucket) -> String {
    format!("{} ({}ms)", bucket.count(), bucket.average_ms())
}
