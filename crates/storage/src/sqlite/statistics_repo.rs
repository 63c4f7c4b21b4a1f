use quiz_core::model::{GameRecord, Statistics};
use sqlx::{Row, SqliteConnection};

use super::SqliteRepository;
use super::mapping::{map_game_row, map_game_row_with_id, ser, u32_from_i64, u64_from_i64};
use crate::repository::{GameRecordRow, StatisticsRepository, StorageError};

fn conn_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Derive the aggregate from the game log.
///
/// The best game is the earliest row with the highest `correct`, which
/// matches "replace only when strictly greater".
async fn read_statistics(conn: &mut SqliteConnection) -> Result<Statistics, StorageError> {
    let totals = sqlx::query(
        r"
            SELECT
                COUNT(*) AS games_count,
                COALESCE(SUM(correct), 0) AS total_correct,
                COALESCE(SUM(total), 0) AS total_questions
            FROM game_records
        ",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(conn_err)?;

    let games_count = u32_from_i64(
        "games_count",
        totals.try_get::<i64, _>("games_count").map_err(ser)?,
    )?;
    let total_correct = u64_from_i64(
        "total_correct",
        totals.try_get::<i64, _>("total_correct").map_err(ser)?,
    )?;
    let total_questions = u64_from_i64(
        "total_questions",
        totals.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;

    let best = sqlx::query(
        r"
            SELECT correct, total, played_at
            FROM game_records
            ORDER BY correct DESC, id ASC
            LIMIT 1
        ",
    )
    .fetch_optional(&mut *conn)
    .await
    .map_err(conn_err)?;
    let best_game = best.as_ref().map(map_game_row).transpose()?;

    Ok(Statistics::from_persisted(
        games_count,
        best_game,
        total_correct,
        total_questions,
    ))
}

#[async_trait::async_trait]
impl StatisticsRepository for SqliteRepository {
    async fn record_game(&self, game: &GameRecord) -> Result<Statistics, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn_err)?;

        sqlx::query(
            r"
                INSERT INTO game_records (correct, total, played_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(i64::from(game.correct()))
        .bind(i64::from(game.total()))
        .bind(game.date())
        .execute(&mut *tx)
        .await
        .map_err(conn_err)?;

        let statistics = read_statistics(&mut tx).await?;
        tx.commit().await.map_err(conn_err)?;

        Ok(statistics)
    }

    async fn load_statistics(&self) -> Result<Statistics, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(conn_err)?;
        read_statistics(&mut conn).await
    }

    async fn recent_games(&self, limit: u32) -> Result<Vec<GameRecordRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, correct, total, played_at
                FROM game_records
                ORDER BY played_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_game_row_with_id(&row)?);
        }
        Ok(out)
    }
}
