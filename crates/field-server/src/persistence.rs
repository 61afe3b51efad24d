use async_trait::async_trait;
use field_core::{FieldError, FieldSnapshot, SnapshotStore};
use sqlx::SqlitePool;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS field_snapshots (
    symbol TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    price REAL NOT NULL,
    log_price REAL NOT NULL,
    returns REAL NOT NULL,
    sigma REAL NOT NULL,
    vwap REAL NOT NULL,
    rsi REAL NOT NULL,
    bb_upper REAL NOT NULL,
    bb_middle REAL NOT NULL,
    bb_lower REAL NOT NULL,
    bb_width REAL NOT NULL,
    squeeze INTEGER NOT NULL,
    tenkan REAL NOT NULL,
    kijun REAL NOT NULL,
    cloud_state INTEGER NOT NULL,
    cloud_thick REAL NOT NULL,
    spread REAL NOT NULL,
    pressure REAL NOT NULL,
    inertia REAL NOT NULL,
    annihilation REAL NOT NULL,
    dealer_p REAL NOT NULL,
    dealer_q REAL NOT NULL,
    dealer_feedback REAL NOT NULL,
    lambda REAL NOT NULL,
    pool_field TEXT NOT NULL,
    forward_map TEXT NOT NULL,
    PRIMARY KEY (symbol, timestamp)
)
"#;

/// SQLite-backed snapshot sink. `INSERT OR REPLACE` on the
/// `(symbol, timestamp)` primary key makes `store` idempotent.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub async fn connect(url: &str) -> Result<Self, FieldError> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| FieldError::Persistence(e.to_string()))?;
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| FieldError::Persistence(e.to_string()))?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn store(&self, snapshot: &FieldSnapshot) -> Result<(), FieldError> {
        let pool_field = serde_json::to_string(&snapshot.pool_field)
            .map_err(|e| FieldError::Persistence(e.to_string()))?;
        let forward_map = serde_json::to_string(&snapshot.forward_map)
            .map_err(|e| FieldError::Persistence(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO field_snapshots
            (symbol, timestamp, price, log_price, returns, sigma, vwap, rsi,
             bb_upper, bb_middle, bb_lower, bb_width, squeeze, tenkan, kijun,
             cloud_state, cloud_thick, spread, pressure, inertia, annihilation,
             dealer_p, dealer_q, dealer_feedback, lambda, pool_field, forward_map)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&snapshot.symbol)
        .bind(snapshot.timestamp.to_rfc3339())
        .bind(snapshot.price)
        .bind(snapshot.log_price)
        .bind(snapshot.returns)
        .bind(snapshot.sigma)
        .bind(snapshot.vwap)
        .bind(snapshot.rsi)
        .bind(snapshot.bb_upper)
        .bind(snapshot.bb_middle)
        .bind(snapshot.bb_lower)
        .bind(snapshot.bb_width)
        .bind(snapshot.squeeze)
        .bind(snapshot.tenkan)
        .bind(snapshot.kijun)
        .bind(snapshot.cloud_state as i32)
        .bind(snapshot.cloud_thick)
        .bind(snapshot.spread)
        .bind(snapshot.pressure)
        .bind(snapshot.inertia)
        .bind(snapshot.annihilation)
        .bind(snapshot.dealer_p)
        .bind(snapshot.dealer_q)
        .bind(snapshot.dealer_feedback)
        .bind(snapshot.lambda)
        .bind(pool_field)
        .bind(forward_map)
        .execute(&self.pool)
        .await
        .map_err(|e| FieldError::Persistence(e.to_string()))?;

        Ok(())
    }
}
