use std::collections::BTreeMap;

use tracing::warn;

use courier_core::{Content, Message, MessageId};

use crate::store::{keys, SharedStore, StoreResult};

/// Read-only view of the `message:<id>` records.
#[derive(Clone)]
pub struct MessageReader {
    store: SharedStore,
}

impl MessageReader {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every stored message, keyed by id.
    ///
    /// Records without usable content are skipped, as are keys under the
    /// message prefix that do not carry a numeric id. A record deleted
    /// between enumeration and fetch simply does not appear.
    pub async fn list(&self) -> StoreResult<BTreeMap<MessageId, String>> {
        let mut out = BTreeMap::new();

        for key in self.store.keys_with_prefix(keys::MESSAGE_PREFIX).await? {
            let Some(id) = keys::message_id(&key) else {
                continue;
            };
            if let Some(msg) = self.get(id).await? {
                out.insert(msg.id, msg.content.into_inner());
            }
        }

        Ok(out)
    }

    /// The message with `id`, if it exists and has content.
    pub async fn get(&self, id: MessageId) -> StoreResult<Option<Message>> {
        let mut record = self.store.hgetall(&keys::message(id)).await?;
        let Some(raw) = record.remove(keys::FIELD_CONTENT) else {
            return Ok(None);
        };

        match Content::new(raw) {
            Ok(content) => Ok(Some(Message::new(id, content))),
            Err(_) => {
                warn!(message_id = %id, "skipping message record with empty content");
                Ok(None)
            }
        }
    }
}
