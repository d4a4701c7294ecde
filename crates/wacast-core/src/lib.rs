// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the wacast campaign service.
//!
//! This crate provides the error type, the domain types shared by every
//! crate in the workspace, and the adapter traits behind which the storage
//! backend, the dispatch queue, and the messaging provider sit.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WacastError;
pub use types::{AdapterType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, PluginAdapter, QueueAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{CounterField, OutboundRecord};
    use crate::types::MessageStatus;

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Queue, AdapterType::Storage] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn outbound_record_picks_counter_from_status() {
        let mut record = OutboundRecord {
            company_id: "co".into(),
            campaign_id: "cmp".into(),
            contact_id: "ct".into(),
            body: "Template: promo".into(),
            wa_message_id: Some("wamid.1".into()),
            status: MessageStatus::Sent,
            error: None,
        };
        assert_eq!(record.counter(), CounterField::Sent);
        record.status = MessageStatus::Failed;
        assert_eq!(record.counter(), CounterField::Failed);
        assert_eq!(CounterField::Read.column(), "read_count");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_queue_adapter<T: QueueAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
