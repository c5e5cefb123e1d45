//! JSON response types and formatting for CLI output.

use serde::Serialize;

use crate::memory_types::ScoredMemory;

/// Response for a successful insert.
#[derive(Serialize)]
pub struct InsertResponse {
    pub status: String,
    pub id: i64,
}

/// Individual query result item.
#[derive(Serialize)]
pub struct QueryResultItem {
    pub id: i64,
    pub command: String,
    pub description: String,
    pub score: f64,
    pub created_at: String,
}

impl From<ScoredMemory> for QueryResultItem {
    fn from(memory: ScoredMemory) -> Self {
        QueryResultItem {
            id: memory.record.id,
            command: memory.record.command_text,
            description: memory.record.description_text,
            score: memory.score,
            created_at: memory.record.created_at.to_rfc3339(),
        }
    }
}

/// Response for `get`: the best match, or `null`.
#[derive(Serialize)]
pub struct GetResponse {
    pub result: Option<QueryResultItem>,
}

/// Response for `list`.
#[derive(Serialize)]
pub struct QueryResponse {
    pub results: Vec<QueryResultItem>,
}

/// Response for `set-key`.
#[derive(Serialize)]
pub struct SetKeyResponse {
    pub status: String,
    pub path: String,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_types::MemoryRecord;
    use chrono::{TimeZone, Utc};

    fn scored() -> ScoredMemory {
        ScoredMemory {
            record: MemoryRecord {
                id: 3,
                command_text: "ls -la".to_string(),
                description_text: "list all files including hidden ones".to_string(),
                embedding: vec![0.1, 0.2],
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            score: 0.75,
        }
    }

    #[test]
    fn test_serialize_insert_response() {
        let response = InsertResponse {
            status: "inserted".to_string(),
            id: 42,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"inserted\""));
        assert!(json.contains("\"id\":42"));
    }

    #[test]
    fn test_serialize_query_response() {
        let response = QueryResponse {
            results: vec![scored().into()],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"results\""));
        assert!(json.contains("\"command\":\"ls -la\""));
        assert!(json.contains("\"score\":0.75"));
        assert!(json.contains("\"created_at\":\"2024-01-01T00:00:00+00:00\""));
        assert!(!json.contains("embedding"));
    }

    #[test]
    fn test_serialize_empty_get_response() {
        let json = serde_json::to_string(&GetResponse { result: None }).unwrap();
        assert_eq!(json, "{\"result\":null}");
    }
}
