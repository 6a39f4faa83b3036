use crate::echo::error::{EchoError, EchoResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw frame as received; `data` is optional on the wire
#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Events a client may send on the echo channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Ping(Map<String, Value>),
    StartBufferbloatTest(Value),
    LoadData(LoadData),
    TestComplete(Value),
}

impl ClientEvent {
    pub fn parse(text: &str) -> EchoResult<Self> {
        let frame: Frame = serde_json::from_str(text)?;

        match frame.event.as_str() {
            "ping" => Ok(ClientEvent::Ping(match frame.data {
                Value::Object(fields) => fields,
                _ => Map::new(),
            })),
            "start-bufferbloat-test" => Ok(ClientEvent::StartBufferbloatTest(frame.data)),
            "load-data" => Ok(ClientEvent::LoadData(LoadData::from_value(frame.data))),
            "test-complete" => Ok(ClientEvent::TestComplete(frame.data)),
            _ => Err(EchoError::UnknownEvent(frame.event)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Ping(_) => "ping",
            ClientEvent::StartBufferbloatTest(_) => "start-bufferbloat-test",
            ClientEvent::LoadData(_) => "load-data",
            ClientEvent::TestComplete(_) => "test-complete",
        }
    }
}

/// Payload of a `load-data` message. Fields pass through untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadData {
    pub timestamp: Option<Value>,
    pub sequence: Option<Value>,
    pub size: Option<Value>,
}

impl LoadData {
    fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            timestamp: take_present(&mut fields, "timestamp"),
            sequence: take_present(&mut fields, "sequence"),
            size: take_present(&mut fields, "size"),
        }
    }
}

/// Fields clients leave empty (null, false, 0, "") count as absent
fn take_present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// Events the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    Pong(Map<String, Value>),
    TestStarted(TestStarted),
    LoadResponse(LoadResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStarted {
    pub server_time: i64,
    pub test_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub client_timestamp: Value,
    pub server_timestamp: i64,
    pub sequence: Value,
    pub size: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ping_keeps_fields() {
        let event = ClientEvent::parse(r#"{"event":"ping","data":{"timestamp":123,"id":"a"}}"#)
            .unwrap();

        match event {
            ClientEvent::Ping(fields) => {
                assert_eq!(fields["timestamp"], 123);
                assert_eq!(fields["id"], "a");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_parse_ping_without_data() {
        let event = ClientEvent::parse(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(event, ClientEvent::Ping(Map::new()));
    }

    #[test]
    fn test_parse_load_data_falsy_fields() {
        let event = ClientEvent::parse(
            r#"{"event":"load-data","data":{"timestamp":0,"sequence":7,"size":null}}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::LoadData(LoadData {
                timestamp: None,
                sequence: Some(json!(7)),
                size: None,
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ClientEvent::parse("not json"),
            Err(EchoError::Malformed(_))
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"disconnect"}"#),
            Err(EchoError::UnknownEvent(name)) if name == "disconnect"
        ));
    }

    #[test]
    fn test_server_event_wire_format() {
        let event = ServerEvent::TestStarted(TestStarted {
            server_time: 42,
            test_id: "s1".to_string(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({ "event": "test-started", "data": { "serverTime": 42, "testId": "s1" } })
        );
    }
}
