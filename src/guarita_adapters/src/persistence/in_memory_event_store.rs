use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use guarita_core::{
    ActionKind, ConsumeOutcome, EventRecord, EventStore, EventStoreError, NewEventRecord,
    SubjectType,
};

/// Vec-backed event log for tests and local development. Mirrors the
/// Postgres store's semantics, including the conditional consuming append.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }

    pub async fn records_of_kind(&self, kind: ActionKind) -> Vec<EventRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.action_kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, record: NewEventRecord) -> Result<EventRecord, EventStoreError> {
        let mut records = self.records.write().await;
        let stored = record.into_record(records.len() as i64 + 1);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn append_all(&self, batch: Vec<NewEventRecord>) -> Result<(), EventStoreError> {
        let mut records = self.records.write().await;
        for record in batch {
            let stored = record.into_record(records.len() as i64 + 1);
            records.push(stored);
        }
        Ok(())
    }

    async fn latest(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kinds: &[ActionKind],
    ) -> Result<Option<EventRecord>, EventStoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| {
                r.subject_type == subject_type
                    && r.subject_id == subject_id
                    && kinds.contains(&r.action_kind)
            })
            .max_by_key(|r| (r.recorded_at, r.id))
            .cloned())
    }

    async fn recent(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kind: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, EventStoreError> {
        let mut matching: Vec<EventRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| {
                r.subject_type == subject_type
                    && r.subject_id == subject_id
                    && r.action_kind == kind
                    && r.recorded_at >= since
            })
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse((r.recorded_at, r.id)));
        Ok(matching)
    }

    async fn consume(
        &self,
        issuance_id: i64,
        batch: Vec<NewEventRecord>,
    ) -> Result<ConsumeOutcome, EventStoreError> {
        let consuming_kind = batch
            .first()
            .ok_or_else(|| EventStoreError::DatabaseError("empty consume batch".to_string()))?
            .action_kind;

        // Holding the write lock across check and append makes the pair
        // atomic, as the Postgres advisory lock does.
        let mut records = self.records.write().await;
        let already_spent = records.iter().any(|r| {
            r.action_kind == consuming_kind && r.references_issuance() == Some(issuance_id)
        });
        if already_spent {
            return Ok(ConsumeOutcome::AlreadyConsumed);
        }
        for record in batch {
            let stored = record.into_record(records.len() as i64 + 1);
            records.push(stored);
        }
        Ok(ConsumeOutcome::Consumed)
    }
}
