use notesum_core::models::result_set::ResultSet;

/// Render rows as text: values joined by `", "`, rows by newlines.
pub fn format_rows(rows: &ResultSet) -> String {
    rows.rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append the rendered rows to the summary prompt, after a newline.
pub fn compose(summary_prompt: &str, rows: &ResultSet) -> String {
    format!("{summary_prompt}\n{}", format_rows(rows))
}
