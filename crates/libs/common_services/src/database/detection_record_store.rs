use crate::database::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use common_types::{Detection, DetectionRecord, NewDetectionRecord};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};

/// A `detection_record` row as it is stored.
///
/// `detections` is left as raw JSON so callers decide how to treat a blob that no longer parses.
#[derive(Debug, Clone, FromRow)]
pub struct StoredDetectionRecord {
    pub id: i64,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub image_width: i64,
    pub image_height: i64,
    pub detection_count: i64,
    pub inference_time_ms: f64,
    pub detections: String,
    pub thumbnail: Option<String>,
}

impl StoredDetectionRecord {
    pub fn decode_detections(&self) -> Result<Vec<Detection>, serde_json::Error> {
        serde_json::from_str(&self.detections)
    }

    /// Combines the row with already decoded detections.
    #[must_use]
    pub fn into_record(self, detections: Vec<Detection>) -> DetectionRecord {
        DetectionRecord {
            id: self.id,
            filename: self.filename,
            upload_time: self.upload_time,
            image_width: self.image_width as u32,
            image_height: self.image_height as u32,
            detection_count: self.detection_count as usize,
            inference_time_ms: self.inference_time_ms,
            detections,
            thumbnail: self.thumbnail,
        }
    }
}

/// Fixed-width RFC 3339, so text order is time order.
fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub struct DetectionRecordStore;

impl DetectionRecordStore {
    /// Appends a record in its own transaction and returns the assigned id.
    pub async fn append(pool: &SqlitePool, record: &NewDetectionRecord) -> Result<i64, DbError> {
        let detections = serde_json::to_string(&record.detections)?;

        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            r"
            INSERT INTO detection_record
                (filename, upload_time, image_width, image_height, detection_count,
                 inference_time_ms, detections, thumbnail)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&record.filename)
        .bind(format_timestamp(&record.upload_time))
        .bind(i64::from(record.image_width))
        .bind(i64::from(record.image_height))
        .bind(record.detection_count() as i64)
        .bind(record.inference_time_ms)
        .bind(detections)
        .bind(&record.thumbnail)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        id: i64,
    ) -> Result<Option<StoredDetectionRecord>, DbError> {
        Ok(sqlx::query_as::<_, StoredDetectionRecord>(
            "SELECT * FROM detection_record WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?)
    }

    /// Newest first. Ties on `upload_time` fall back to the higher id.
    pub async fn list(
        executor: impl Executor<'_, Database = Sqlite>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoredDetectionRecord>, DbError> {
        Ok(sqlx::query_as::<_, StoredDetectionRecord>(
            r"
            SELECT * FROM detection_record
            ORDER BY upload_time DESC, id DESC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
    }

    /// One page plus the total row count, read from the same snapshot.
    pub async fn list_page(
        pool: &SqlitePool,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<StoredDetectionRecord>, i64), DbError> {
        let mut tx = pool.begin().await?;
        let records = Self::list(&mut *tx, offset, limit).await?;
        let total = Self::count(&mut *tx).await?;
        tx.commit().await?;
        Ok((records, total))
    }

    pub async fn count(executor: impl Executor<'_, Database = Sqlite>) -> Result<i64, DbError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM detection_record")
                .fetch_one(executor)
                .await?,
        )
    }

    /// Records uploaded at or after `boundary`.
    pub async fn count_since(
        executor: impl Executor<'_, Database = Sqlite>,
        boundary: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM detection_record WHERE upload_time >= ?",
        )
        .bind(format_timestamp(&boundary))
        .fetch_one(executor)
        .await?)
    }

    pub async fn sum_detection_counts(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(detection_count), 0) FROM detection_record",
        )
        .fetch_one(executor)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_pool;
    use chrono::Duration;

    fn record(filename: &str, detections: Vec<Detection>) -> NewDetectionRecord {
        NewDetectionRecord::new(filename, (640, 480), detections, 21.5, None)
    }

    #[tokio::test]
    async fn append_then_find_round_trips() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        let new = NewDetectionRecord::new(
            "street.jpg",
            (1280, 720),
            vec![
                Detection::new([1.0, 2.0, 30.5, 40.25], "person", 0, 0.91),
                Detection::new([-4.0, 0.0, 700.0, 20.0], "car", 2, 0.55),
            ],
            17.25,
            Some("thumb_x.jpg".to_string()),
        );

        let id = DetectionRecordStore::append(&pool, &new).await?;
        let stored = DetectionRecordStore::find_by_id(&pool, id)
            .await?
            .ok_or_else(|| color_eyre::eyre::eyre!("record {id} missing"))?;
        let detections = stored.decode_detections()?;
        let found = stored.into_record(detections);

        assert_eq!(found, new.into_record(id));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_none() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        assert!(DetectionRecordStore::find_by_id(&pool, 42).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn ids_increase_and_listing_is_newest_first() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(DetectionRecordStore::append(&pool, &record(&format!("{i}.jpg"), vec![])).await?);
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let (page, total) = DetectionRecordStore::list_page(&pool, 0, 3).await?;
        assert_eq!(total, 5);
        let listed: Vec<i64> = page.iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![ids[4], ids[3], ids[2]]);

        let (rest, _) = DetectionRecordStore::list_page(&pool, 3, 3).await?;
        let listed: Vec<i64> = rest.iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![ids[1], ids[0]]);

        let (beyond, total) = DetectionRecordStore::list_page(&pool, 10, 3).await?;
        assert!(beyond.is_empty());
        assert_eq!(total, 5);
        Ok(())
    }

    #[tokio::test]
    async fn equal_upload_times_order_by_id() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        let first = record("a.jpg", vec![]);
        let second = NewDetectionRecord {
            filename: "b.jpg".into(),
            ..first.clone()
        };
        let a = DetectionRecordStore::append(&pool, &first).await?;
        let b = DetectionRecordStore::append(&pool, &second).await?;

        let listed: Vec<i64> = DetectionRecordStore::list(&pool, 0, 10)
            .await?
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![b, a]);
        Ok(())
    }

    #[tokio::test]
    async fn aggregates() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        assert_eq!(DetectionRecordStore::sum_detection_counts(&pool).await?, 0);

        let person = Detection::new([0.0, 0.0, 1.0, 1.0], "person", 0, 0.5);
        let mut old = record("old.jpg", vec![person.clone()]);
        old.upload_time -= Duration::days(2);
        DetectionRecordStore::append(&pool, &old).await?;
        DetectionRecordStore::append(&pool, &record("new.jpg", vec![person.clone(), person])).await?;
        DetectionRecordStore::append(&pool, &record("none.jpg", vec![])).await?;

        assert_eq!(DetectionRecordStore::count(&pool).await?, 3);
        assert_eq!(DetectionRecordStore::sum_detection_counts(&pool).await?, 3);
        let since = Utc::now() - Duration::days(1);
        assert_eq!(DetectionRecordStore::count_since(&pool, since).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_appends_all_land() -> color_eyre::Result<()> {
        let (pool, _dir) = test_pool().await?;
        let mut handles = Vec::new();
        for i in 0..16 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                DetectionRecordStore::append(&pool, &record(&format!("{i}.jpg"), vec![])).await
            }));
        }
        for handle in handles {
            handle.await??;
        }
        assert_eq!(DetectionRecordStore::count(&pool).await?, 16);
        Ok(())
    }
}
