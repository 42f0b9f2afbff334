//! LLM-backed batch grouping
//!
//! Renders a batch into the grouping prompt, sends it to a chat backend and
//! turns the JSON reply back into domain groups.

pub mod ai;

pub use ai::backend::{ChatBackend, HttpChatBackend};
pub use ai::prompts::{build_grouping_prompt, format_student_line, format_students};

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use seatplan_domain::model::{Fleet, Group, Student};
use seatplan_domain::service::audit_groups;
use seatplan_domain::GroupAssigner;
use seatplan_types::{Error, Result};

/// Chat backend settings
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
        }
    }
}

impl PlannerConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the HTTP backend for these settings
    pub fn http_backend(&self, api_key: &str) -> Result<HttpChatBackend> {
        HttpChatBackend::new(&self.endpoint, &self.model, self.temperature, api_key)
    }
}

/// Top-level reply object
#[derive(Debug, Deserialize)]
struct GroupingReply {
    #[serde(default)]
    groups: Vec<ReplyGroup>,
}

#[derive(Debug, Deserialize)]
struct ReplyGroup {
    #[serde(default, deserialize_with = "lenient_u32")]
    group_id: u32,
    #[serde(default)]
    vehicle: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    capacity: u32,
    #[serde(default)]
    students: Vec<ReplyStudent>,
}

#[derive(Debug, Deserialize)]
struct ReplyStudent {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
}

/// Models sometimes emit ids as bare numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid student id: {}", other))),
    }
}

/// Accepts `19`, `"19"`, `19.0` and `null` (as 0)
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Null => Some(0),
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom(format!("expected a whole number, got {}", value)))
}

/// Extract JSON from response (handles markdown code blocks)
pub fn extract_json_from_response(response: &str) -> String {
    let mut body = response.trim();

    if body.starts_with("```") {
        if let Some(end) = body.rfind("```") {
            let start = body.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                body = body[start..end].trim();
            }
        }
    }

    if let Some(start) = body.find('{') {
        if let Some(end) = body.rfind('}') {
            if start < end {
                return body[start..=end].to_string();
            }
        }
    }

    body.to_string()
}

/// Parse a grouping reply into groups for `batch`.
///
/// Reply students are matched to the batch by id so the structured roster
/// record (coordinates, file index, pickup times) survives the round trip.
/// Ids the batch does not know are kept with the reply's name and address.
pub fn parse_response(response: &str, batch: &[Student], fleet: &Fleet) -> Result<Vec<Group>> {
    let json_str = extract_json_from_response(response);

    let reply: GroupingReply = serde_json::from_str(&json_str).map_err(|e| {
        let truncated: String = response.chars().take(500).collect();
        Error::Llm(format!("could not parse grouping reply: {} | raw: {}", e, truncated))
    })?;

    let by_id: HashMap<&str, &Student> = batch.iter().map(|s| (s.id.as_str(), s)).collect();

    let groups = reply
        .groups
        .into_iter()
        .enumerate()
        .map(|(idx, g)| {
            let slot = fleet.vehicles().get(idx);
            let vehicle = if g.vehicle.trim().is_empty() {
                slot.map(|v| v.name.clone()).unwrap_or_default()
            } else {
                g.vehicle
            };
            let capacity = if g.capacity == 0 {
                slot.map(|v| v.capacity).unwrap_or(0)
            } else {
                g.capacity
            };
            let students = g
                .students
                .into_iter()
                .map(|s| match by_id.get(s.id.as_str()) {
                    Some(known) => (*known).clone(),
                    None => Student {
                        source_index: Student::source_index_of(&s.id).unwrap_or(0),
                        id: s.id,
                        name: s.name,
                        address: s.address,
                        pickup: Default::default(),
                        location: None,
                    },
                })
                .collect();
            Group {
                group_id: if g.group_id == 0 { idx as u32 + 1 } else { g.group_id },
                vehicle,
                capacity,
                students,
            }
        })
        .collect();

    Ok(groups)
}

/// Group assigner that delegates each batch to a chat model
pub struct LlmAssigner<B: ChatBackend> {
    backend: B,
}

impl<B: ChatBackend> LlmAssigner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: ChatBackend> GroupAssigner for LlmAssigner<B> {
    fn name(&self) -> &str {
        "llm"
    }

    fn assign_batch(&self, batch: &[Student], fleet: &Fleet) -> Result<Vec<Group>> {
        let prompt = build_grouping_prompt(batch, fleet);
        tracing::debug!(chars = prompt.len(), "grouping prompt built");

        let response = self.backend.send_prompt(&prompt)?;
        let groups = parse_response(&response, batch, fleet)?;

        // The model is not bound by the rules; report what it got wrong.
        let audit = audit_groups(batch, &groups);
        for (group_id, seated, capacity) in &audit.over_capacity {
            tracing::warn!(group_id, seated, capacity, "model overfilled a vehicle");
        }
        if !audit.missing.is_empty() {
            tracing::warn!(missing = ?audit.missing, "model left students out");
        }
        if !audit.duplicated.is_empty() {
            tracing::warn!(duplicated = ?audit.duplicated, "model seated students twice");
        }
        if !audit.unknown.is_empty() {
            tracing::warn!(unknown = ?audit.unknown, "model returned ids not in the batch");
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_domain::model::GeoPoint;
    use std::cell::RefCell;

    struct CannedBackend {
        reply: String,
        prompts: RefCell<Vec<String>>,
    }

    impl CannedBackend {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatBackend for CannedBackend {
        fn send_prompt(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn batch() -> Vec<Student> {
        vec![
            Student::new(0, "1", "Anna", "Lipowa 1").with_location(GeoPoint::new(50.0, 19.9)),
            Student::new(0, "2", "Jan", "Lipowa 2"),
        ]
    }

    const REPLY: &str = r#"```json
{
  "groups": [
    {"group_id": 1, "vehicle": "Mercedes Sprinter", "capacity": 19,
     "students": [
        {"id": "0_2", "name": "Jan", "address": "Lipowa 2", "pickup_time": "14:30"},
        {"id": "0_1", "name": "Anna", "address": "Lipowa 1", "pickup_time": "14:30"}
     ]}
  ]
}
```"#;

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"test\": 123}\n```";
        assert_eq!(extract_json_from_response(response), "{\"test\": 123}");
    }

    #[test]
    fn test_extract_json_bare_fence() {
        let response = "```\n{\"test\": 123}\n```";
        assert_eq!(extract_json_from_response(response), "{\"test\": 123}");
    }

    #[test]
    fn test_extract_json_single_line_fence() {
        let response = "```json{\"test\": 123}```";
        assert_eq!(extract_json_from_response(response), "{\"test\": 123}");
    }

    #[test]
    fn test_extract_json_plain() {
        let response = "{\"test\": 123}";
        assert_eq!(extract_json_from_response(response), "{\"test\": 123}");
    }

    #[test]
    fn test_extract_json_with_text() {
        let response = "Here is the result: {\"test\": 123} end";
        assert_eq!(extract_json_from_response(response), "{\"test\": 123}");
    }

    #[test]
    fn test_parse_response_keeps_reply_order_and_roster_records() {
        let groups = parse_response(REPLY, &batch(), &Fleet::standard()).unwrap();
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].students.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["0_2", "0_1"]);
        // structured fields come from the roster, not the reply
        assert!(groups[0].students[1].location.is_some());
    }

    #[test]
    fn test_parse_response_fills_missing_vehicle_from_fleet() {
        let reply = r#"{"groups":[{"students":[]},{"group_id":2,"students":[{"id":7,"name":"Ola","address":"Polna 3"}]}]}"#;
        let groups = parse_response(reply, &batch(), &Fleet::standard()).unwrap();
        assert_eq!(groups[0].group_id, 1);
        assert_eq!(groups[0].vehicle, "Mercedes Sprinter");
        assert_eq!(groups[0].capacity, 19);
        assert_eq!(groups[1].vehicle, "Ford Transit");
        // unknown numeric id kept verbatim
        assert_eq!(groups[1].students[0].id, "7");
        assert_eq!(groups[1].students[0].name, "Ola");
    }

    #[test]
    fn test_parse_response_accepts_quoted_numbers() {
        let reply = r#"{"groups":[{"group_id":"2","vehicle":"Ford Transit","capacity":"16","students":[{"id":"0_1"}]},{"group_id":3.0,"capacity":null,"students":[]}]}"#;
        let groups = parse_response(reply, &batch(), &Fleet::standard()).unwrap();
        assert_eq!(groups[0].group_id, 2);
        assert_eq!(groups[0].capacity, 16);
        assert_eq!(groups[0].students[0].name, "Anna");
        assert_eq!(groups[1].group_id, 3);
        // null capacity falls back to the fleet slot
        assert_eq!(groups[1].capacity, 16);
    }

    #[test]
    fn test_parse_response_rejects_non_numeric_capacity() {
        let reply = r#"{"groups":[{"group_id":1,"capacity":"nineteen","students":[]}]}"#;
        assert!(matches!(
            parse_response(reply, &batch(), &Fleet::standard()),
            Err(Error::Llm(_))
        ));
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = parse_response("I could not do that.", &batch(), &Fleet::standard()).unwrap_err();
        match err {
            Error::Llm(msg) => assert!(msg.contains("I could not do that.")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_llm_assigner_sends_batch_and_parses() {
        let assigner = LlmAssigner::new(CannedBackend::new(REPLY));
        let groups = assigner.assign_batch(&batch(), &Fleet::standard()).unwrap();
        assert_eq!(groups[0].len(), 2);
        let prompts = assigner.backend.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("ID: 0_1, Name: Anna"));
    }
}
