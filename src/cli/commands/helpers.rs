//! Shared helper functions for command execution.

use chrono::Local;

use crate::api::types::Update;

const TABLE_HEADERS: [&str; 6] = ["ID", "Channel", "Version", "Created", "Message", "Status"];

/// Render updates as an aligned text table with a header row
pub(super) fn update_table(updates: &[Update]) -> String {
    let rows: Vec<[String; 6]> = updates
        .iter()
        .map(|update| {
            [
                update.id.clone(),
                update.channel.clone(),
                update.runtime_version.clone(),
                update
                    .created_at
                    .with_timezone(&Local)
                    .format("%Y/%m/%d %H:%M")
                    .to_string(),
                update.message.clone(),
                update.status.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &TABLE_HEADERS.map(str::to_string), &widths);
    push_row(&mut table, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UpdateStatus;
    use chrono::Utc;

    fn update(id: &str, message: &str) -> Update {
        Update {
            id: id.to_string(),
            channel: "production".to_string(),
            runtime_version: "1.0.0".to_string(),
            created_at: Utc::now(),
            message: message.to_string(),
            status: UpdateStatus::Published,
        }
    }

    #[test]
    fn table_has_header_separator_and_one_line_per_update() {
        let table = update_table(&[update("upd_1", "first"), update("upd_2", "second")]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("--"));
        assert!(lines[2].starts_with("upd_1"));
        assert!(lines[3].starts_with("upd_2"));
    }

    #[test]
    fn columns_line_up_across_rows() {
        let table = update_table(&[update("a", "short"), update("much-longer-id", "msg")]);
        let lines: Vec<&str> = table.lines().collect();

        // Every row places "Channel"/"production" at the same offset.
        let channel_col = lines[0].find("Channel").unwrap();
        assert_eq!(lines[2].find("production").unwrap(), channel_col);
        assert_eq!(lines[3].find("production").unwrap(), channel_col);
    }
}
