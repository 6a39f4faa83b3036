use crate::echo::error::EchoResult;
use crate::echo::types::{ClientEvent, LoadData, LoadResponse, ServerEvent, TestStarted};
use crate::metrics;
use crate::session::{now_millis, EchoSession, SessionGuard, SessionRegistry};
use serde_json::Value;

/// Server side of one echo session.
///
/// Holds the session's registry entry for as long as the channel lives.
#[derive(Debug)]
pub struct EchoChannel {
    session: SessionGuard,
}

impl EchoChannel {
    pub fn open(registry: &SessionRegistry) -> Self {
        Self {
            session: registry.connect(),
        }
    }

    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    /// Leave the registry, returning the session as it stood at disconnect
    pub fn close(self) -> Option<EchoSession> {
        self.session.close()
    }

    /// Parse and answer one text frame
    pub fn handle_text(&self, text: &str) -> EchoResult<Option<ServerEvent>> {
        let event = ClientEvent::parse(text)?;
        self.handle(event)
    }

    /// Answer one event. Echo replies are produced unconditionally.
    pub fn handle(&self, event: ClientEvent) -> EchoResult<Option<ServerEvent>> {
        metrics::record_echo_message(event.name());

        match event {
            ClientEvent::Ping(mut fields) => {
                let server_timestamp = now_millis();
                fields.insert("serverTimestamp".to_string(), server_timestamp.into());
                fields.insert("responseTime".to_string(), server_timestamp.into());
                Ok(Some(ServerEvent::Pong(fields)))
            }
            ClientEvent::LoadData(data) => Ok(Some(ServerEvent::LoadResponse(
                Self::load_response(data, now_millis()),
            ))),
            ClientEvent::StartBufferbloatTest(config) => {
                let restarted = self.session.update(|s| {
                    let unfinished = s.is_testing();
                    s.start_test(config);
                    unfinished
                })?;
                tracing::info!(
                    session_id = %self.session_id(),
                    restarted,
                    "Starting bufferbloat test"
                );
                Ok(Some(ServerEvent::TestStarted(TestStarted {
                    server_time: now_millis(),
                    test_id: self.session_id().to_string(),
                })))
            }
            ClientEvent::TestComplete(results) => {
                tracing::info!(
                    session_id = %self.session_id(),
                    results = %results,
                    "Test completed for client"
                );
                self.session.update(|s| s.complete_test(results))?;
                Ok(None)
            }
        }
    }

    fn load_response(data: LoadData, server_timestamp: i64) -> LoadResponse {
        LoadResponse {
            client_timestamp: data
                .timestamp
                .unwrap_or_else(|| Value::from(server_timestamp)),
            server_timestamp,
            sequence: data.sequence.unwrap_or_else(|| Value::from(0)),
            size: data.size.unwrap_or_else(|| Value::from(0)),
        }
    }
}
