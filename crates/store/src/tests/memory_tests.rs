// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{rows, sample_rows};
use crate::{MarkUsedOutcome, MemoryTicketStore, TicketStore, ValidationEvent};
use porteiro_domain::{
    CanonicalTicketRow, TicketStatus, ValidationHistoryEntry, ValidationStats, ValidationStatus,
};

#[tokio::test]
async fn test_import_returns_rows_processed() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    let count: usize = store.import_tickets(rows(&["QR1", "QR2", "QR3"])).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(store.total_tickets().await.unwrap(), 3);
}

#[tokio::test]
async fn test_import_replaces_not_merges() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["A", "B", "C"])).await.unwrap();
    store.import_tickets(rows(&["D"])).await.unwrap();

    assert_eq!(store.total_tickets().await.unwrap(), 1);
    assert!(store.fetch_ticket("A").await.unwrap().is_none());
    assert!(store.fetch_ticket("D").await.unwrap().is_some());
}

#[tokio::test]
async fn test_duplicate_qr_dedups_last_row_wins() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    let mut duplicated: Vec<CanonicalTicketRow> = rows(&["QR1", "QR1"]);
    duplicated[1].name = String::from("Second Holder");

    let processed: usize = store.import_tickets(duplicated).await.unwrap();
    // Rows processed, not unique tickets persisted.
    assert_eq!(processed, 2);
    assert_eq!(store.total_tickets().await.unwrap(), 1);

    let ticket = store.fetch_ticket("QR1").await.unwrap().unwrap();
    assert_eq!(ticket.name.as_deref(), Some("Second Holder"));
}

#[tokio::test]
async fn test_validate_is_idempotent() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["QR1"])).await.unwrap();

    let first = store.validate_ticket("QR1").await.unwrap();
    assert!(first.success);
    assert_eq!(first.status, ValidationStatus::Valid);
    let ticket = first.ticket.expect("validated result carries the ticket");
    assert_eq!(ticket.validation_count, 1);
    assert!(ticket.validation_date.is_some());

    let second = store.validate_ticket("QR1").await.unwrap();
    assert!(!second.success);
    assert_eq!(second.status, ValidationStatus::Used);
    let ticket = second.ticket.expect("used result carries the ticket");
    assert_eq!(ticket.validation_count, 1);
}

#[tokio::test]
async fn test_unknown_code_is_not_found_and_leaves_no_history() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["QR1"])).await.unwrap();

    let result = store.validate_ticket("DOES_NOT_EXIST").await.unwrap();
    assert!(!result.success);
    assert_eq!(result.status, ValidationStatus::NotFound);
    assert!(store.validation_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_used_is_conditional() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["QR1"])).await.unwrap();

    let first: MarkUsedOutcome = store.mark_used("QR1").await.unwrap();
    assert!(matches!(first, MarkUsedOutcome::Updated(_)));

    let second: MarkUsedOutcome = store.mark_used("QR1").await.unwrap();
    match second {
        MarkUsedOutcome::AlreadyUsed(ticket) => assert_eq!(ticket.validation_count, 1),
        other => panic!("expected AlreadyUsed, got {other:?}"),
    }

    assert_eq!(
        store.mark_used("MISSING").await.unwrap(),
        MarkUsedOutcome::Missing
    );
}

#[tokio::test]
async fn test_stats_consistency() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store
        .import_tickets(rows(&["A", "B", "C", "D", "E"]))
        .await
        .unwrap();

    store.validate_ticket("A").await.unwrap();
    store.validate_ticket("C").await.unwrap();

    let stats: ValidationStats = store.validation_stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.valid, 3);
    assert_eq!(stats.used, 2);
    assert_eq!(stats.validation_count, 2);
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["A", "B"])).await.unwrap();

    store.validate_ticket("A").await.unwrap();
    store.validate_ticket("B").await.unwrap();

    let history: Vec<ValidationHistoryEntry> = store.validation_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].qr_code, "B");
    assert_eq!(history[1].qr_code, "A");
    assert_eq!(history[0].status, "validated");
}

#[tokio::test]
async fn test_clear_removes_tickets_and_history() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["A"])).await.unwrap();
    store.validate_ticket("A").await.unwrap();

    store.clear().await.unwrap();

    assert_eq!(store.total_tickets().await.unwrap(), 0);
    assert!(store.validation_history().await.unwrap().is_empty());
    assert_eq!(store.validation_stats().await.unwrap(), ValidationStats::default());
}

#[tokio::test]
async fn test_sample_export_imports_with_used_ticket() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(sample_rows()).await.unwrap();

    let used = store.fetch_ticket("QR555666777").await.unwrap().unwrap();
    assert_eq!(used.status, TicketStatus::Used);
    assert_eq!(used.validation_count, 1);

    // A pre-used ticket rejects validation with its original date.
    let result = store.validate_ticket("QR555666777").await.unwrap();
    assert_eq!(result.status, ValidationStatus::Used);
    assert!(result.message.contains("2024-01-15T19:30:00Z"));
}

#[tokio::test]
async fn test_subscription_observes_validation() {
    let store: MemoryTicketStore = MemoryTicketStore::new();
    store.import_tickets(rows(&["QR1"])).await.unwrap();

    let mut subscription = store.subscribe_to_validations();
    store.validate_ticket("QR1").await.unwrap();

    assert_eq!(
        subscription.recv().await,
        Some(ValidationEvent::TicketUsed {
            qr_code: String::from("QR1")
        })
    );
    assert_eq!(
        subscription.recv().await,
        Some(ValidationEvent::HistoryInserted {
            qr_code: String::from("QR1")
        })
    );
}
