use std::path::Path;

use odoolink_core::{AppError, AppResult};
use odoolink_domain::Record;

/// Reads a JSON array of objects, keeping each object's key order.
pub fn read_records(path: &Path) -> AppResult<Vec<Record>> {
    let contents = std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!("failed to read '{}': {error}", path.display()))
    })?;

    parse_records(contents.as_str())
        .map_err(|error| AppError::Validation(format!("'{}': {error}", path.display())))
}

fn parse_records(contents: &str) -> Result<Vec<Record>, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::parse_records;

    #[test]
    fn keeps_key_order_of_each_object() {
        let records = parse_records(
            r#"[{"id": "__import__.p1", "name": "Acme", "city": "Lyon"},
                {"id": "__import__.p2", "name": "Globex", "city": "Nantes"}]"#,
        );

        let Ok(records) = records else {
            panic!("valid records file should parse");
        };
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "city"]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn rejects_non_object_entries() {
        assert!(parse_records(r#"[1, 2]"#).is_err());
        assert!(parse_records(r#"{"id": 1}"#).is_err());
    }
}
