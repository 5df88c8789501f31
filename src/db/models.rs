use crate::types::{PriceSample, QuantityTier};

/// Raw `price_samples` row. Used by sqlx for typed fetches.
#[derive(Debug, sqlx::FromRow)]
pub struct SampleRow {
    pub gid: i64,
    pub quantity: i64,
    pub price: Option<i64>,
    pub recorded_at: i64,
    pub server_id: i64,
}

impl SampleRow {
    /// Rows carrying an unknown tier value are dropped rather than
    /// surfaced; the boundary validation makes them unreachable through
    /// the ingest path.
    pub fn into_sample(self) -> Option<PriceSample> {
        let quantity = QuantityTier::try_from(self.quantity).ok()?;
        Some(PriceSample {
            gid: self.gid,
            quantity,
            price: self.price,
            recorded_at: self.recorded_at,
            server_id: self.server_id,
        })
    }
}
