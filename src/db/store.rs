use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::warn;

use crate::db::models::SampleRow;
use crate::error::Result;
use crate::types::{PriceSample, QuantityTier};

/// Filter for a range fetch against the sample table. `quantity == None`
/// pools all tiers; `since == None` spans the full stored history.
#[derive(Debug, Clone, Copy)]
pub struct SampleScope {
    pub server_id: i64,
    pub quantity: Option<QuantityTier>,
    pub since: Option<i64>,
    pub gid: Option<i64>,
}

impl SampleScope {
    pub fn server(server_id: i64) -> Self {
        Self {
            server_id,
            quantity: None,
            since: None,
            gid: None,
        }
    }

    pub fn quantity(mut self, quantity: Option<QuantityTier>) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn gid(mut self, gid: i64) -> Self {
        self.gid = Some(gid);
        self
    }
}

/// Sample pending insertion through the ingest path.
#[derive(Debug, Clone)]
pub struct NewSample {
    pub gid: i64,
    pub quantity: QuantityTier,
    pub price: Option<i64>,
    pub recorded_at: i64,
    pub server_id: i64,
}

/// Append-only price sample store over SQLite. Readers and the single
/// writer share the pool; batches commit atomically.
#[derive(Clone)]
pub struct SampleStore {
    pool: SqlitePool,
}

impl SampleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends one ingest batch in a single transaction.
    pub async fn insert_batch(&self, samples: &[NewSample]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for s in samples {
            sqlx::query(
                "INSERT INTO price_samples (gid, quantity, price, recorded_at, server_id) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(s.gid)
            .bind(s.quantity.as_i64())
            .bind(s.price)
            .bind(s.recorded_at)
            .bind(s.server_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Fetches priced samples matching the scope, ordered by
    /// `recorded_at` (insertion order breaks ties). Unpriced rows never
    /// leave the store through this path.
    pub async fn fetch_priced(&self, scope: &SampleScope) -> Result<Vec<PriceSample>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT gid, quantity, price, recorded_at, server_id \
             FROM price_samples WHERE price IS NOT NULL AND server_id = ",
        );
        qb.push_bind(scope.server_id);
        if let Some(quantity) = scope.quantity {
            qb.push(" AND quantity = ").push_bind(quantity.as_i64());
        }
        if let Some(since) = scope.since {
            qb.push(" AND recorded_at >= ").push_bind(since);
        }
        if let Some(gid) = scope.gid {
            qb.push(" AND gid = ").push_bind(gid);
        }
        qb.push(" ORDER BY recorded_at ASC, id ASC");

        let rows: Vec<SampleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let total = rows.len();
        let samples: Vec<PriceSample> = rows.into_iter().filter_map(SampleRow::into_sample).collect();
        if samples.len() < total {
            warn!(
                dropped = total - samples.len(),
                "dropped sample rows with unknown quantity tier"
            );
        }
        Ok(samples)
    }

    pub async fn sample_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_samples")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SampleStore {
        // Single connection: each sqlite :memory: connection is its own DB.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        SampleStore::new(pool)
    }

    fn sample(gid: i64, price: Option<i64>, recorded_at: i64, server_id: i64) -> NewSample {
        NewSample {
            gid,
            quantity: QuantityTier::Hundred,
            price,
            recorded_at,
            server_id,
        }
    }

    #[tokio::test]
    async fn fetch_excludes_unpriced_rows() {
        let store = memory_store().await;
        store
            .insert_batch(&[
                sample(1, Some(100), 10, 1),
                sample(1, None, 20, 1),
                sample(1, Some(110), 30, 1),
                sample(1, None, 40, 1),
            ])
            .await
            .unwrap();

        let fetched = store.fetch_priced(&SampleScope::server(1)).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|s| s.price.is_some()));
        assert_eq!(store.sample_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn fetch_orders_by_recorded_at() {
        let store = memory_store().await;
        store
            .insert_batch(&[
                sample(1, Some(300), 30, 1),
                sample(1, Some(100), 10, 1),
                sample(1, Some(200), 20, 1),
                sample(1, Some(400), 40, 1),
            ])
            .await
            .unwrap();

        let fetched = store.fetch_priced(&SampleScope::server(1)).await.unwrap();
        let times: Vec<i64> = fetched.iter().map(|s| s.recorded_at).collect();
        assert_eq!(times, vec![10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn scope_filters_server_window_and_tier() {
        let store = memory_store().await;
        store
            .insert_batch(&[
                sample(1, Some(100), 10, 1),
                sample(1, Some(100), 50, 2),
                NewSample {
                    quantity: QuantityTier::Ten,
                    ..sample(1, Some(100), 60, 1)
                },
                sample(1, Some(100), 70, 1),
            ])
            .await
            .unwrap();

        // Other server excluded.
        let fetched = store.fetch_priced(&SampleScope::server(1)).await.unwrap();
        assert_eq!(fetched.len(), 3);

        // Window boundary is inclusive of `since`.
        let windowed = store
            .fetch_priced(&SampleScope::server(1).since(60))
            .await
            .unwrap();
        assert_eq!(windowed.len(), 2);

        // Tier narrows; None pools.
        let tiered = store
            .fetch_priced(&SampleScope::server(1).quantity(Some(QuantityTier::Ten)))
            .await
            .unwrap();
        assert_eq!(tiered.len(), 1);
        assert_eq!(tiered[0].quantity, QuantityTier::Ten);
    }

    #[tokio::test]
    async fn gid_scope_narrows_to_one_item() {
        let store = memory_store().await;
        store
            .insert_batch(&[
                sample(1, Some(100), 10, 1),
                sample(2, Some(200), 20, 1),
                sample(1, Some(120), 30, 1),
                sample(3, Some(300), 40, 1),
            ])
            .await
            .unwrap();

        let fetched = store
            .fetch_priced(&SampleScope::server(1).gid(1))
            .await
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|s| s.gid == 1));
    }
}
