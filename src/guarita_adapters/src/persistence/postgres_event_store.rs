use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use guarita_core::{
    ActionKind, ConsumeOutcome, EventRecord, EventStore, EventStoreError, NewEventRecord,
    SubjectType, ISSUANCE_ID_KEY,
};

/// Append-only security log backed by the `events` table. Rows are inserted
/// and read, never updated or deleted.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresEventStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    subject_type: String,
    subject_id: String,
    actor_account_id: Option<Uuid>,
    action_kind: String,
    prior_state: Option<Value>,
    new_state: Option<Value>,
    recorded_at: DateTime<Utc>,
    note: Option<String>,
}

impl EventRow {
    fn into_record(self) -> Result<EventRecord, EventStoreError> {
        let subject_type = SubjectType::parse(&self.subject_type).ok_or_else(|| {
            EventStoreError::DatabaseError(format!("unknown subject type: {}", self.subject_type))
        })?;
        let action_kind = ActionKind::parse(&self.action_kind).ok_or_else(|| {
            EventStoreError::DatabaseError(format!("unknown action kind: {}", self.action_kind))
        })?;

        Ok(EventRecord {
            id: self.id,
            subject_type,
            subject_id: self.subject_id,
            actor_account_id: self.actor_account_id,
            action_kind,
            prior_state: self.prior_state,
            new_state: self.new_state,
            recorded_at: self.recorded_at,
            note: self.note,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, subject_type, subject_id, actor_account_id, \
     action_kind, prior_state, new_state, recorded_at, note FROM events";

const INSERT_SQL: &str = "INSERT INTO events \
     (subject_type, subject_id, actor_account_id, action_kind, prior_state, new_state, \
      recorded_at, note) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id";

fn database(e: sqlx::Error) -> EventStoreError {
    EventStoreError::DatabaseError(e.to_string())
}

async fn insert_record<'e, E>(executor: E, record: &NewEventRecord) -> Result<i64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_scalar(INSERT_SQL)
        .bind(record.subject_type.as_str())
        .bind(&record.subject_id)
        .bind(record.actor_account_id)
        .bind(record.action_kind.as_str())
        .bind(&record.prior_state)
        .bind(&record.new_state)
        .bind(record.recorded_at)
        .bind(&record.note)
        .fetch_one(executor)
        .await
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[tracing::instrument(name = "Appending event to PostgreSQL", skip_all)]
    async fn append(&self, record: NewEventRecord) -> Result<EventRecord, EventStoreError> {
        let id = insert_record(&self.pool, &record).await.map_err(database)?;
        Ok(record.into_record(id))
    }

    #[tracing::instrument(name = "Appending event batch to PostgreSQL", skip_all)]
    async fn append_all(&self, records: Vec<NewEventRecord>) -> Result<(), EventStoreError> {
        let mut tx = self.pool.begin().await.map_err(database)?;
        for record in &records {
            insert_record(&mut *tx, record).await.map_err(database)?;
        }
        tx.commit().await.map_err(database)
    }

    #[tracing::instrument(name = "Querying latest event in PostgreSQL", skip_all)]
    async fn latest(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kinds: &[ActionKind],
    ) -> Result<Option<EventRecord>, EventStoreError> {
        let kind_names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

        let row: Option<EventRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} \
             WHERE subject_type = $1 AND subject_id = $2 AND action_kind = ANY($3) \
             ORDER BY recorded_at DESC, id DESC LIMIT 1"
        ))
        .bind(subject_type.as_str())
        .bind(subject_id)
        .bind(&kind_names)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        row.map(EventRow::into_record).transpose()
    }

    #[tracing::instrument(name = "Querying recent events in PostgreSQL", skip_all)]
    async fn recent(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kind: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, EventStoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} \
             WHERE subject_type = $1 AND subject_id = $2 AND action_kind = $3 \
               AND recorded_at >= $4 \
             ORDER BY recorded_at DESC, id DESC"
        ))
        .bind(subject_type.as_str())
        .bind(subject_id)
        .bind(kind.as_str())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.into_iter().map(EventRow::into_record).collect()
    }

    #[tracing::instrument(name = "Consuming issuance in PostgreSQL", skip_all, fields(issuance_id))]
    async fn consume(
        &self,
        issuance_id: i64,
        records: Vec<NewEventRecord>,
    ) -> Result<ConsumeOutcome, EventStoreError> {
        let consuming_kind = records
            .first()
            .ok_or_else(|| EventStoreError::DatabaseError("empty consume batch".to_string()))?
            .action_kind;

        let mut tx = self.pool.begin().await.map_err(database)?;

        // Serialize concurrent consumers of the same issuance; the lock is
        // released at commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(issuance_id)
            .execute(&mut *tx)
            .await
            .map_err(database)?;

        let spent: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM events \
             WHERE action_kind = $1 AND (new_state->>'{ISSUANCE_ID_KEY}')::bigint = $2 \
             LIMIT 1"
        ))
        .bind(consuming_kind.as_str())
        .bind(issuance_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database)?;

        if spent.is_some() {
            return Ok(ConsumeOutcome::AlreadyConsumed);
        }

        for record in &records {
            insert_record(&mut *tx, record).await.map_err(database)?;
        }
        tx.commit().await.map_err(database)?;

        Ok(ConsumeOutcome::Consumed)
    }
}
