//! SQLite adapter: candle storage plus backtest history.

use crate::domain::candle::{Candle, RAW_DATE_FORMAT};
use crate::domain::error::FoliobackError;
use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use crate::ports::candle_port::CandleSource;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::{HistoryReader, HistorySink};
use chrono::{NaiveDate, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone)]
pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> FoliobackError {
    FoliobackError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> FoliobackError {
    FoliobackError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn persistence_error(e: impl std::fmt::Display) -> FoliobackError {
    FoliobackError::Persistence {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FoliobackError> {
        let db_path = config.require_string("sqlite", "path")?;
        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, FoliobackError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, FoliobackError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), FoliobackError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS candles (
                    code TEXT NOT NULL,
                    date TEXT NOT NULL,
                    close REAL NOT NULL,
                    PRIMARY KEY (code, date)
                );
                CREATE TABLE IF NOT EXISTS backtest_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user TEXT NOT NULL,
                    test_type TEXT NOT NULL,
                    seed_money INTEGER NOT NULL,
                    period_months INTEGER NOT NULL,
                    assets_json TEXT,
                    final_balance INTEGER NOT NULL,
                    total_return REAL NOT NULL,
                    cagr REAL NOT NULL,
                    mdd REAL NOT NULL,
                    created_at TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_history_user ON backtest_history(user);",
            )
            .map_err(query_error)
    }

    /// Upserts candles for `code`; returns the number written.
    pub fn insert_candles(&self, code: &str, candles: &[Candle]) -> Result<usize, FoliobackError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for candle in candles {
            tx.execute(
                "INSERT OR REPLACE INTO candles (code, date, close) VALUES (?1, ?2, ?3)",
                params![code, candle.raw_date(), candle.close],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        Ok(candles.len())
    }
}

impl CandleSource for SqliteAdapter {
    fn recent_candles(&self, code: &str, lookback: usize) -> Result<Vec<Candle>, FoliobackError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, close FROM candles
                 WHERE code = ?1
                 ORDER BY date DESC
                 LIMIT ?2",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![code, lookback as i64], |row| {
                let date_str: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&date_str, RAW_DATE_FORMAT).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(Candle::new(date, row.get(1)?))
            })
            .map_err(query_error)?;

        let mut candles = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        candles.reverse();
        Ok(candles)
    }
}

impl HistorySink for SqliteAdapter {
    fn save(&self, record: &NewHistoryRecord) -> Result<i64, FoliobackError> {
        let conn = self.pool.get().map_err(persistence_error)?;
        conn.execute(
            "INSERT INTO backtest_history
                (user, test_type, seed_money, period_months, assets_json,
                 final_balance, total_return, cagr, mdd, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.user,
                record.test_type,
                record.seed_money,
                record.period_months,
                record.assets_json,
                record.final_balance,
                record.total_return,
                record.cagr,
                record.mdd,
                record.created_at.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )
        .map_err(persistence_error)?;
        Ok(conn.last_insert_rowid())
    }
}

impl HistoryReader for SqliteAdapter {
    fn list_by_user(&self, user: &str) -> Result<Vec<HistoryRecord>, FoliobackError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user, test_type, seed_money, period_months, assets_json,
                        final_balance, total_return, cagr, mdd, created_at
                 FROM backtest_history
                 WHERE user = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![user], |row| {
                let created_at: Option<String> = row.get(10)?;
                Ok(HistoryRecord {
                    id: row.get(0)?,
                    user: row.get(1)?,
                    test_type: row.get(2)?,
                    seed_money: row.get(3)?,
                    period_months: row.get(4)?,
                    assets_json: row.get(5)?,
                    final_balance: row.get(6)?,
                    total_return: row.get(7)?,
                    cagr: row.get(8)?,
                    mdd: row.get(9)?,
                    created_at: created_at.and_then(|s| {
                        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()
                    }),
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }
}
