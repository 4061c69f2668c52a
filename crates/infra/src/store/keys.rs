//! Store key layout.

use courier_core::{JobId, MessageId};

/// Counter shared by every creator; `INCR` yields the next message id.
pub const MESSAGE_COUNTER: &str = "message_counter";

/// Prefix of message hash keys (`message:<id>`).
pub const MESSAGE_PREFIX: &str = "message:";

const JOB_PREFIX: &str = "job:";

pub const FIELD_ID: &str = "id";
pub const FIELD_CONTENT: &str = "content";

pub fn message(id: MessageId) -> String {
    format!("{MESSAGE_PREFIX}{id}")
}

pub fn job(id: JobId) -> String {
    format!("{JOB_PREFIX}{id}")
}

/// Recover the message id from a `message:<id>` key.
pub fn message_id(key: &str) -> Option<MessageId> {
    key.strip_prefix(MESSAGE_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keys_round_trip() {
        let id = MessageId::new(12).unwrap();
        assert_eq!(message(id), "message:12");
        assert_eq!(message_id("message:12"), Some(id));
    }

    #[test]
    fn counter_is_not_a_message_key() {
        assert!(!MESSAGE_COUNTER.starts_with(MESSAGE_PREFIX));
        assert_eq!(message_id(MESSAGE_COUNTER), None);
        assert_eq!(message_id("message:abc"), None);
    }

    #[test]
    fn job_key_embeds_the_uuid() {
        let id = JobId::new();
        assert_eq!(job(id), format!("job:{id}"));
    }
}
