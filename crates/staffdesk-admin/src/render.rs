//! Plain-text rendering of list pages, single records, and pick lists.

use staffdesk_model::{page_count, EntitySchema, FieldAccess, FieldKind, FieldValue, Record};

use crate::options::ReferenceOptions;

/// Aligned table of the schema's list columns, one line per row.
#[must_use]
pub fn render_table(schema: &EntitySchema, rows: &[Record]) -> String {
    let columns: Vec<_> = schema.columns().collect();
    let header: Vec<String> = columns.iter().map(|spec| spec.label.to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|spec| cell_text(spec.kind, row.get(spec.name)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns.len())
        .map(|index| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(header[index].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str(&format!("(no {} records)\n", schema.title));
    }
    out
}

/// `page 2 of 3, 23 rows`.
#[must_use]
pub fn render_footer(page: u32, page_size: u32, total: u64) -> String {
    let noun = if total == 1 { "row" } else { "rows" };
    format!(
        "page {page} of {}, {total} {noun}",
        page_count(total, page_size)
    )
}

/// `Label: value` lines for every field a reader may see.
#[must_use]
pub fn render_record(schema: &EntitySchema, record: &Record) -> String {
    let visible: Vec<_> = schema
        .fields
        .iter()
        .filter(|spec| matches!(spec.access, FieldAccess::ReadWrite | FieldAccess::ReadOnly))
        .collect();
    let width = visible
        .iter()
        .map(|spec| spec.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for spec in visible {
        let value = cell_text(spec.kind, record.get(spec.name));
        let line = format!("{:<width$}  {value}", format!("{}:", spec.label), width = width + 1);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// `id  label` lines of a pick list.
#[must_use]
pub fn render_options(options: &ReferenceOptions) -> String {
    let width = options
        .iter()
        .map(|option| option.id.to_string().len())
        .max()
        .unwrap_or(0);
    options
        .iter()
        .map(|option| format!("{:>width$}  {}\n", option.id, option.label))
        .collect()
}

fn cell_text(kind: FieldKind, value: Option<&FieldValue>) -> String {
    match (kind, value) {
        (FieldKind::Reference { target, .. }, Some(FieldValue::Record(record))) => {
            target.schema().display_label(record)
        }
        (_, Some(value)) => value.to_string(),
        (_, None) => String::new(),
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use serde_json::json;
    use staffdesk_model::schema::{EMPLOYEE, LEAVE, USER};

    use super::*;

    fn employee(id: i64, first: &str, last: &str, email: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("firstName", first)
            .with("lastName", last)
            .with("email", email)
            .with("phoneNumber", "5550100")
            .with("address", "1 Main St")
            .with("gender", "FEMALE")
    }

    #[test]
    fn employee_table() {
        let rows = [
            employee(1, "Jane", "Doe", "jane@example.com"),
            employee(12, "Li", "Wu", "li@x.io"),
        ];
        expect![[r#"
ID  First Name  Last Name  Email             Phone Number  Gender
--  ----------  ---------  ----------------  ------------  ------
1   Jane        Doe        jane@example.com  5550100       FEMALE
12  Li          Wu         li@x.io           5550100       FEMALE
"#]]
        .assert_eq(&render_table(&EMPLOYEE, &rows));
    }

    #[test]
    fn leave_table_labels_the_embedded_employee() {
        let leave = LEAVE
            .decode(&json!({
                "id": 3,
                "employee": {"id": 1, "firstName": "Jane", "lastName": "Doe"},
                "employeeId": 1,
                "startDate": "2024-03-01T00:00:00.000Z",
                "endDate": "2024-03-04T00:00:00.000Z",
                "reason": "",
            }))
            .expect("leave");
        expect![[r#"
ID  Employee  Start Date  End Date    Reason
--  --------  ----------  ----------  ------
3   Jane Doe  2024-03-01  2024-03-04
"#]]
        .assert_eq(&render_table(&LEAVE, &[leave]));
    }

    #[test]
    fn empty_table_says_so() {
        expect![[r#"
ID  First Name  Last Name  Email  Birth Date  Gender
--  ----------  ---------  -----  ----------  ------
(no user records)
"#]]
        .assert_eq(&render_table(&USER, &[]));
    }

    #[test]
    fn record_hides_passwords() {
        let user = Record::new()
            .with("id", 5_i64)
            .with("firstName", "Ann")
            .with("lastName", "Lee")
            .with("email", "ann@example.com")
            .with("password", "secret1")
            .with("gender", "FEMALE");
        expect![[r#"
ID:          5
First Name:  Ann
Last Name:   Lee
Email:       ann@example.com
Birth Date:
Gender:      FEMALE
"#]]
        .assert_eq(&render_record(&USER, &user));
    }

    #[test]
    fn footer_counts_pages() {
        assert_eq!(render_footer(2, 10, 23), "page 2 of 3, 23 rows");
        assert_eq!(render_footer(1, 10, 1), "page 1 of 1, 1 row");
        assert_eq!(render_footer(1, 10, 0), "page 1 of 1, 0 rows");
    }
}
