//! Rendering of export rows to delimited text and JSON.

use platewatch_core::{CoreError, ExportRow};

/// Column headers of the export table, in row order.
pub const EXPORT_HEADER: [&str; 9] = [
    "Restaurant",
    "Followers",
    "Total Posts",
    "Average Likes",
    "Average Comments",
    "Engagement Rate (%)",
    "Growth Rate (%)",
    "Top Tags",
    "Exported At",
];

/// Render rows as delimited text with a header line.
///
/// Fields containing the delimiter or a quote are quoted, with embedded
/// quotes doubled. The tag column always contains commas, so with the default
/// delimiter it comes out quoted.
pub fn render_delimited(rows: &[ExportRow], delimiter: char) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        &EXPORT_HEADER.map(String::from),
        delimiter,
    );
    for row in rows {
        let fields = [
            row.restaurant.clone(),
            row.follower_count.to_string(),
            row.post_count.to_string(),
            format!("{:.2}", row.avg_likes),
            format!("{:.2}", row.avg_comments),
            format!("{:.2}", row.engagement_rate),
            format!("{:.2}", row.growth_rate),
            row.top_tags.clone(),
            row.exported_at.to_rfc3339(),
        ];
        push_line(&mut out, &fields, delimiter);
    }
    out
}

/// Render rows as pretty-printed JSON.
pub fn render_json(rows: &[ExportRow]) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

fn push_line(out: &mut String, fields: &[String], delimiter: char) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(delimiter);
        }
        first = false;
        out.push_str(&escape_field(field, delimiter));
    }
    out.push('\n');
}

fn escape_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row() -> ExportRow {
        ExportRow {
            restaurant: "@cafe".to_string(),
            follower_count: 1200,
            post_count: 8,
            avg_likes: 101.5,
            avg_comments: 9.25,
            engagement_rate: 12.34,
            growth_rate: -3.5,
            top_tags: "#foodie,#soulfood".to_string(),
            exported_at: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn delimited_output_has_header_and_rows() {
        let out = render_delimited(&[row()], ',');
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Restaurant,Followers,Total Posts"));
        assert!(lines[1].starts_with("@cafe,1200,8,101.50,9.25,12.34,-3.50"));
    }

    #[test]
    fn comma_joined_tags_are_quoted_under_comma_delimiter() {
        let out = render_delimited(&[row()], ',');
        assert!(out.contains("\"#foodie,#soulfood\""));
    }

    #[test]
    fn alternate_delimiter_leaves_tags_unquoted() {
        let out = render_delimited(&[row()], ';');
        assert!(out.contains(";#foodie,#soulfood;"));
    }

    #[test]
    fn empty_rows_render_header_only() {
        let out = render_delimited(&[], ',');
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn json_output_contains_fields() {
        let out = render_json(&[row()]).expect("json render");
        assert!(out.contains("\"restaurant\": \"@cafe\""));
        assert!(out.contains("\"engagement_rate\": 12.34"));
    }
}
