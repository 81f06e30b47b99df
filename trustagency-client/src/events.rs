//! Gateway event broadcast.
//!
//! Auth transitions and UI-raised notifications fan out over a tokio
//! broadcast channel. Sending with no subscribers is not an error.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// A 401 arrived with no refresh token to recover with.
    Expired,
    /// The refresh call itself failed.
    RefreshFailed,
    UserInitiated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    AuthLogin { username: String },
    AuthRegister { username: String },
    AuthLogout { reason: LogoutReason },
    SectionChanged { section: String },
}

impl GatewayEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GatewayEvent::AuthLogin { .. } => "auth:login",
            GatewayEvent::AuthRegister { .. } => "auth:register",
            GatewayEvent::AuthLogout { .. } => "auth:logout",
            GatewayEvent::SectionChanged { .. } => "section:changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: GatewayEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receivers) => debug!(event_type, receivers, "Emitted gateway event"),
            Err(_) => debug!(event_type, "No subscribers for gateway event"),
        }
    }

    /// Receive all events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.tx.subscribe()
    }

    /// Raised by UI code when the active site section changes.
    pub fn section_changed(&self, section: impl Into<String>) {
        self.emit(GatewayEvent::SectionChanged {
            section: section.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscribers() {
        let bus = EventBus::new(4);
        bus.emit(GatewayEvent::AuthLogout {
            reason: LogoutReason::Expired,
        });
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.section_changed("forex");
        assert_eq!(
            rx.recv().await.unwrap(),
            GatewayEvent::SectionChanged {
                section: "forex".into()
            }
        );
    }

    #[test]
    fn serialized_shape() {
        let event = GatewayEvent::AuthLogout {
            reason: LogoutReason::RefreshFailed,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "auth_logout", "reason": "refresh_failed"})
        );
        assert_eq!(event.event_type(), "auth:logout");

        let registered = GatewayEvent::AuthRegister {
            username: "newbie".into(),
        };
        assert_eq!(
            serde_json::to_value(&registered).unwrap(),
            serde_json::json!({"type": "auth_register", "username": "newbie"})
        );
        assert_eq!(registered.event_type(), "auth:register");
    }
}
