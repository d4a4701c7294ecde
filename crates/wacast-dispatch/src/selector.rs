// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact selection for a campaign.

use std::collections::HashSet;

use tracing::debug;
use wacast_core::types::Contact;
use wacast_core::{StorageAdapter, WacastError};

use crate::phone::PhoneNormalizer;

/// A contact chosen for a campaign, with its normalized phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub contact: Contact,
    pub phone: String,
}

/// The outcome of target selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub targets: Vec<Target>,
    pub skipped_blocked: usize,
    pub skipped_duplicate: usize,
}

/// Selects the deduplicated, non-blocklisted contacts of a company segment.
///
/// Fails with [`WacastError::EmptyTargetSet`] when nothing remains, in which
/// case no campaign may be created.
pub async fn select_targets(
    storage: &dyn StorageAdapter,
    normalizer: &dyn PhoneNormalizer,
    company_id: &str,
    segment_id: &str,
) -> Result<Selection, WacastError> {
    let contacts = storage.list_segment_contacts(company_id, segment_id).await?;
    let blocked: HashSet<String> = storage
        .list_blocklist(Some(company_id))
        .await?
        .into_iter()
        .map(|entry| entry.phone)
        .collect();

    let selection = filter_targets(contacts, &blocked, normalizer);
    debug!(
        company_id,
        segment_id,
        targets = selection.targets.len(),
        skipped_blocked = selection.skipped_blocked,
        skipped_duplicate = selection.skipped_duplicate,
        "targets selected"
    );
    if selection.targets.is_empty() {
        return Err(WacastError::EmptyTargetSet);
    }
    Ok(selection)
}

/// Applies the blocklist and phone dedup to contacts in their given order.
///
/// The blocklist matches the stored phone exactly; dedup is on the
/// normalized phone and the first occurrence wins.
pub fn filter_targets(
    contacts: Vec<Contact>,
    blocked: &HashSet<String>,
    normalizer: &dyn PhoneNormalizer,
) -> Selection {
    let mut seen = HashSet::new();
    let mut selection = Selection::default();
    for contact in contacts {
        if blocked.contains(&contact.phone) {
            selection.skipped_blocked += 1;
            continue;
        }
        let phone = normalizer.normalize(&contact.phone);
        if !seen.insert(phone.clone()) {
            selection.skipped_duplicate += 1;
            continue;
        }
        selection.targets.push(Target { contact, phone });
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::CountryCodeNormalizer;
    use wacast_test_utils::TestHarness;
    use wacast_test_utils::harness::{COMPANY_ID, SEGMENT_ID};

    fn contact(id: &str, phone: &str) -> Contact {
        Contact {
            id: id.into(),
            company_id: "co".into(),
            name: id.into(),
            phone: phone.into(),
            email: None,
            city: None,
            notes: None,
            segments: vec!["seg".into()],
            created_at: String::new(),
        }
    }

    #[test]
    fn same_normalized_phone_keeps_first_contact() {
        let contacts = vec![
            contact("a", "9876543210"),
            contact("b", "+91 98765 43210"),
            contact("c", "9000000001"),
        ];
        let selection =
            filter_targets(contacts, &HashSet::new(), &CountryCodeNormalizer::new("91", 10));

        let ids: Vec<_> = selection.targets.iter().map(|t| t.contact.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(selection.skipped_duplicate, 1);
        assert_eq!(selection.targets[0].phone, "919876543210");
    }

    #[test]
    fn blocklist_matches_stored_phone_exactly() {
        let contacts = vec![contact("a", "+919876543210"), contact("b", "9876543210")];
        let blocked: HashSet<String> = ["+919876543210".to_string()].into();
        let selection = filter_targets(contacts, &blocked, &CountryCodeNormalizer::new("91", 10));

        assert_eq!(selection.skipped_blocked, 1);
        assert_eq!(selection.targets.len(), 1);
        assert_eq!(selection.targets[0].contact.id, "b");
    }

    #[tokio::test]
    async fn selects_from_storage_and_skips_blocked() {
        let harness = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_contact("Ravi", "9876500000")
            .with_contact("Outsider", "9876511111")
            .with_blocked("9876500000")
            .build()
            .await
            .unwrap();

        let selection = select_targets(
            harness.storage.as_ref(),
            &CountryCodeNormalizer::default(),
            COMPANY_ID,
            SEGMENT_ID,
        )
        .await
        .unwrap();

        let phones: Vec<_> = selection.targets.iter().map(|t| t.phone.as_str()).collect();
        assert_eq!(phones, ["919876543210", "919876511111"]);
        assert_eq!(selection.skipped_blocked, 1);
    }

    #[tokio::test]
    async fn fully_blocked_segment_is_empty_target_set() {
        let harness = TestHarness::builder()
            .with_contact("Asha", "9876543210")
            .with_blocked("9876543210")
            .build()
            .await
            .unwrap();

        let err = select_targets(
            harness.storage.as_ref(),
            &CountryCodeNormalizer::default(),
            COMPANY_ID,
            SEGMENT_ID,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WacastError::EmptyTargetSet));
    }
}
