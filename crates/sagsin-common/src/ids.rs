//! Session ID generation.
//!
//! Each `send-packet` activation gets a fresh UUIDv4, visible in every
//! emitted progress frame for that session (§3, `Session`).

use uuid::Uuid;

/// Generate a fresh session ID.
pub fn session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(session_id(), session_id());
    }

    #[test]
    fn session_id_is_valid_uuid() {
        let id = session_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
