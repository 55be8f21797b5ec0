//! Wire protocol between the controller, node agents, and SSE observers.
//!
//! Two independent channels exist:
//! - a **TCP relay frame**, one JSON object per connection, no length
//!   prefix — the receiver reads until EOF or its timeout (§6.2);
//! - **SSE progress events**, `event: <type>\ndata: <json>\n\n` frames
//!   broadcast to every `/events` subscriber (§6.1, §4.8).

use serde::{Deserialize, Serialize};

/// Default TCP port every node agent listens on, absent a
/// `NODE_TCP_PORT` override (spec.md §6.4).
pub const DEFAULT_NODE_TCP_PORT: u16 = 9000;

/// The sole coupling between the controller and the outside world: a
/// deterministic function from `node_id` to the hostname its agent
/// process is reachable at. An in-process deployment can swap TCP for
/// a direct channel without touching any other contract (spec.md §9).
pub fn node_hostname(node_id: i32) -> String {
    format!("sagsin-node-{node_id}")
}

// ── TCP relay frame ─────────────────────────────────────────────────

/// Single JSON frame relayed hop-to-hop over a fresh TCP connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayFrame {
    pub session_id: String,
    pub path: Vec<i32>,
    pub idx: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayFrame {
    /// Whether this frame has a next hop to forward to.
    pub fn has_next_hop(&self) -> bool {
        self.idx + 1 < self.path.len()
    }

    /// The frame to send on to the next hop.
    pub fn advance(&self) -> Option<RelayFrame> {
        if !self.has_next_hop() {
            return None;
        }
        Some(RelayFrame {
            session_id: self.session_id.clone(),
            path: self.path.clone(),
            idx: self.idx + 1,
            message: self.message.clone(),
        })
    }
}

// ── SSE packet-progress events ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Pending,
    Success,
}

/// `packet-progress` SSE payload: `{type,status,sessionId,nodeId,cumulativeLatencyMs,message?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketProgressEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: PacketStatus,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "nodeId")]
    pub node_id: i32,
    #[serde(rename = "cumulativeLatencyMs")]
    pub cumulative_latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PacketProgressEvent {
    pub fn new(
        status: PacketStatus,
        session_id: impl Into<String>,
        node_id: i32,
        cumulative_latency_ms: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            event_type: "packet-progress".to_string(),
            status,
            session_id: session_id.into(),
            node_id,
            cumulative_latency_ms,
            message,
        }
    }

    /// Render as an SSE frame: `event: packet-progress\ndata: {...}\n\n`.
    pub fn to_sse_frame(&self) -> String {
        let json = serde_json::to_string(self).expect("packet-progress serialization");
        format!("event: packet-progress\ndata: {json}\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_hostname_is_stable_and_distinct() {
        assert_eq!(node_hostname(0), node_hostname(0));
        assert_ne!(node_hostname(0), node_hostname(1));
    }

    #[test]
    fn relay_frame_advances_until_path_end() {
        let frame = RelayFrame {
            session_id: "s1".into(),
            path: vec![0, 1, 2],
            idx: 0,
            message: Some("hi".into()),
        };
        assert!(frame.has_next_hop());
        let next = frame.advance().unwrap();
        assert_eq!(next.idx, 1);
        assert_eq!(next.message.as_deref(), Some("hi"));

        let last = RelayFrame {
            session_id: "s1".into(),
            path: vec![0, 1, 2],
            idx: 2,
            message: None,
        };
        assert!(!last.has_next_hop());
        assert!(last.advance().is_none());
    }

    #[test]
    fn packet_progress_sse_frame_has_event_and_data_lines() {
        let evt = PacketProgressEvent::new(PacketStatus::Pending, "s1", 0, 0.0, Some("hi".into()));
        let frame = evt.to_sse_frame();
        assert!(frame.starts_with("event: packet-progress\n"));
        assert!(frame.contains("\"status\":\"pending\""));
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn packet_progress_round_trips() {
        let evt = PacketProgressEvent::new(PacketStatus::Success, "s1", 2, 12.5, None);
        let json = serde_json::to_string(&evt).unwrap();
        let parsed: PacketProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.node_id, 2);
        assert_eq!(parsed.status, PacketStatus::Success);
        assert!(parsed.message.is_none());
    }
}
