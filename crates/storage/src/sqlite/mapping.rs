use quiz_core::model::GameRecord;
use sqlx::Row;

use crate::repository::{GameRecordRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_game_row(row: &sqlx::sqlite::SqliteRow) -> Result<GameRecord, StorageError> {
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let played_at = row.try_get("played_at").map_err(ser)?;

    GameRecord::new(correct, total, played_at).map_err(ser)
}

pub(crate) fn map_game_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<GameRecordRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(GameRecordRow::new(id, map_game_row(row)?))
}
