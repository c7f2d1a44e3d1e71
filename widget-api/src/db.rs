//! Async client for the widget store.
//!
//! The store is synchronous and opens one SQLite handle per call, so every
//! call runs on the blocking thread pool.

use std::sync::Arc;

use widget_core::{StorageTuple, StorageValue, Widget, WidgetId};
use widget_storage::{Operation, WidgetStore};

use crate::config::MalformedRecordPolicy;
use crate::error::{ApiError, ApiResult};

/// Shared handle used by the route handlers.
#[derive(Debug, Clone)]
pub struct WidgetDb {
    store: Arc<WidgetStore>,
    malformed_records: MalformedRecordPolicy,
}

impl WidgetDb {
    pub fn new(store: WidgetStore, malformed_records: MalformedRecordPolicy) -> Self {
        Self {
            store: Arc::new(store),
            malformed_records,
        }
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    async fn execute(
        &self,
        op: Operation,
        params: Option<Vec<StorageValue>>,
    ) -> ApiResult<Vec<StorageTuple>> {
        let store = Arc::clone(&self.store);
        let rows = tokio::task::spawn_blocking(move || store.execute(op, params.as_deref()))
            .await??;
        Ok(rows)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Every stored widget, decoded per the malformed-record policy.
    pub async fn list_all(&self) -> ApiResult<Vec<Widget>> {
        let rows = self.execute(Operation::SelectAll, None).await?;
        decode_rows(&rows, self.malformed_records)
    }

    /// Every widget with exactly this name, decoded per the malformed-record policy.
    pub async fn find_by_name(&self, name: &str) -> ApiResult<Vec<Widget>> {
        let rows = self
            .execute(Operation::SelectByName, Some(vec![name.into()]))
            .await?;
        decode_rows(&rows, self.malformed_records)
    }

    /// The widget stored under `id`. A stored row that fails to decode is
    /// always an error here.
    pub async fn get_by_id(&self, id: WidgetId) -> ApiResult<Option<Widget>> {
        let rows = self.select_by_id(id).await?;
        first_row(&rows)
    }

    /// Fail with `WIDGET_NOT_FOUND` unless a row is stored under `id`.
    ///
    /// Only the raw row count is checked, so a malformed row still counts
    /// as existing.
    pub async fn check_existence(&self, id: WidgetId) -> ApiResult<Vec<StorageTuple>> {
        let rows = self.select_by_id(id).await?;
        if rows.is_empty() {
            return Err(ApiError::widget_not_found(id));
        }
        Ok(rows)
    }

    /// Load the widget under `id` for a read-modify-write. Missing rows are
    /// `WIDGET_NOT_FOUND`; undecodable rows are always surfaced.
    pub async fn load(&self, id: WidgetId) -> ApiResult<Widget> {
        let rows = self.check_existence(id).await?;
        first_row(&rows)?.ok_or_else(|| ApiError::widget_not_found(id))
    }

    async fn select_by_id(&self, id: WidgetId) -> ApiResult<Vec<StorageTuple>> {
        self.execute(Operation::SelectById, Some(vec![id.to_string().into()]))
            .await
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Insert `widget` and return the row as persisted.
    pub async fn create(&self, widget: &Widget) -> ApiResult<Widget> {
        let rows = self
            .execute(Operation::Insert, Some(Vec::from(widget.to_tuple().into_inner())))
            .await?;
        first_row(&rows)?
            .ok_or_else(|| ApiError::internal_error("Inserted widget was not found on refetch"))
    }

    /// Replace the stored row with the same id as `widget`.
    ///
    /// Returns `None` when no row with that id exists any more.
    pub async fn update(&self, widget: &Widget) -> ApiResult<Option<Widget>> {
        let rows = self
            .execute(
                Operation::UpdateById,
                Some(Vec::from(widget.to_tuple().into_inner())),
            )
            .await?;
        first_row(&rows)
    }

    /// Delete the row stored under `id`. Returns what remains under that id,
    /// which is empty on success.
    pub async fn delete(&self, id: WidgetId) -> ApiResult<Vec<Widget>> {
        let rows = self
            .execute(Operation::DeleteById, Some(vec![id.to_string().into()]))
            .await?;
        decode_rows(&rows, MalformedRecordPolicy::Fail)
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Create the database file and table now rather than on the first request.
    pub async fn bootstrap(&self) -> ApiResult<()> {
        self.execute(Operation::CreateTable, None).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> ApiResult<()> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.ping()).await??;
        Ok(())
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode stored rows. Under `Skip`, rows that fail to decode are logged and
/// left out.
pub fn decode_rows(rows: &[StorageTuple], policy: MalformedRecordPolicy) -> ApiResult<Vec<Widget>> {
    let mut widgets = Vec::with_capacity(rows.len());
    for row in rows {
        match Widget::from_tuple(row) {
            Ok(widget) => widgets.push(widget),
            Err(e) if policy == MalformedRecordPolicy::Skip => {
                tracing::warn!(error = %e, key = ?row.key(), "Skipping malformed widget record");
            }
            Err(e) => return Err(as_malformed(e)),
        }
    }
    Ok(widgets)
}

fn first_row(rows: &[StorageTuple]) -> ApiResult<Option<Widget>> {
    rows.first()
        .map(|row| Widget::from_tuple(row).map_err(as_malformed))
        .transpose()
}

/// Any decode failure of a stored row is a server fault, including a name
/// that passed the store but fails validation.
fn as_malformed(err: widget_core::RecordError) -> ApiError {
    if err.is_malformed() {
        err.into()
    } else {
        tracing::error!(error = %err, "Stored widget record fails validation");
        ApiError::malformed_record(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn stored(name: &str, quantity: StorageValue) -> StorageTuple {
        StorageTuple::new([
            StorageValue::from(Uuid::nil().to_string()),
            StorageValue::from(name),
            quantity,
            StorageValue::from("1970-01-01T00:00:00Z"),
            StorageValue::from("1970-01-01T00:00:00Z"),
        ])
    }

    #[test]
    fn test_decode_rows_skip_policy_drops_bad_rows() -> ApiResult<()> {
        let rows = vec![
            stored("dummy", StorageValue::Integer(9999)),
            stored("dummy", StorageValue::from("lots")),
        ];
        let widgets = decode_rows(&rows, MalformedRecordPolicy::Skip)?;
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].quantity(), 9999);
        Ok(())
    }

    #[test]
    fn test_decode_rows_fail_policy_surfaces_bad_rows() {
        let rows = vec![
            stored("dummy", StorageValue::Integer(9999)),
            stored("dummy", StorageValue::from("lots")),
        ];
        let err = decode_rows(&rows, MalformedRecordPolicy::Fail);
        assert!(matches!(err, Err(e) if e.code == crate::error::ErrorCode::MalformedRecord));
    }

    #[test]
    fn test_stored_invalid_name_is_skipped_like_any_bad_row() -> ApiResult<()> {
        let rows = vec![stored("", StorageValue::Integer(1))];
        assert!(decode_rows(&rows, MalformedRecordPolicy::Skip)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_stored_invalid_name_is_server_fault() {
        let rows = vec![stored("", StorageValue::Integer(1))];
        let err = decode_rows(&rows, MalformedRecordPolicy::Fail);
        assert!(matches!(err, Err(e) if e.code == crate::error::ErrorCode::MalformedRecord));
    }

    #[test]
    fn test_first_row_decodes_epoch_record() -> ApiResult<()> {
        let rows = vec![stored("dummy", StorageValue::Integer(9999))];
        let widget = first_row(&rows)?.ok_or_else(|| ApiError::internal_error("no row"))?;
        let epoch = Utc.timestamp_opt(0, 0).single();
        assert_eq!(Some(widget.created_at()), epoch);
        assert!(first_row(&[])?.is_none());
        Ok(())
    }
}
