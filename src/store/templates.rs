//! Operation and spare-part catalog operations.
//!
//! Both catalogs behave the same way: entries are unique by id and by code,
//! and imports skip anything already present.

use super::{now_rfc3339, required, timestamp_id, Collection, DataStore, Record};
use crate::errors::AppError;
use crate::models::{
    ImportReport, NewOperation, NewSparePart, OperationTemplate, SparePartTemplate, DEFAULT_UNIT,
};

/// A catalog entry as submitted by the UI or an import file.
pub trait CatalogDraft: Sized {
    type Entry: Record;

    /// Prefix for generated ids, e.g. `OP` gives `OP-1700000000000`.
    const ID_PREFIX: &'static str;
    const DUPLICATE_CODE: &'static str;
    const DUPLICATE_ID: &'static str;

    fn draft_id(&self) -> Option<&str>;
    fn draft_code(&self) -> Option<&str>;
    fn entry_code(entry: &Self::Entry) -> &str;

    /// Build the stored entry, or `None` when code or name is missing.
    fn into_entry(self, id: String, created_at: String) -> Option<Self::Entry>;
}

impl CatalogDraft for NewOperation {
    type Entry = OperationTemplate;

    const ID_PREFIX: &'static str = "OP";
    const DUPLICATE_CODE: &'static str = "Operacija sa ovom šifrom već postoji";
    const DUPLICATE_ID: &'static str = "Operacija sa ovim ID-jem već postoji";

    fn draft_id(&self) -> Option<&str> {
        required(&self.id)
    }

    fn draft_code(&self) -> Option<&str> {
        required(&self.code)
    }

    fn entry_code(entry: &OperationTemplate) -> &str {
        &entry.code
    }

    fn into_entry(self, id: String, created_at: String) -> Option<OperationTemplate> {
        let code = required(&self.code)?.to_string();
        let name = required(&self.name)?.to_string();
        Some(OperationTemplate {
            id,
            code,
            name,
            description: self.description.unwrap_or_default(),
            is_active: true,
            created_at,
        })
    }
}

impl CatalogDraft for NewSparePart {
    type Entry = SparePartTemplate;

    const ID_PREFIX: &'static str = "SP";
    const DUPLICATE_CODE: &'static str = "Rezervni deo sa ovom šifrom već postoji";
    const DUPLICATE_ID: &'static str = "Rezervni deo sa ovim ID-jem već postoji";

    fn draft_id(&self) -> Option<&str> {
        required(&self.id)
    }

    fn draft_code(&self) -> Option<&str> {
        required(&self.code)
    }

    fn entry_code(entry: &SparePartTemplate) -> &str {
        &entry.code
    }

    fn into_entry(self, id: String, created_at: String) -> Option<SparePartTemplate> {
        let code = required(&self.code)?.to_string();
        let name = required(&self.name)?.to_string();
        let unit = required(&self.unit).unwrap_or(DEFAULT_UNIT).to_string();
        Some(SparePartTemplate {
            id,
            code,
            name,
            unit,
            is_active: true,
            created_at,
        })
    }
}

/// Add one entry, rejecting a duplicate code or explicitly given id.
pub async fn create_entry<D: CatalogDraft>(
    collection: &Collection<D::Entry>,
    draft: D,
) -> Result<D::Entry, AppError> {
    let code = draft.draft_code().map(str::to_string);
    let explicit_id = draft.draft_id().map(str::to_string);
    let id = explicit_id
        .clone()
        .unwrap_or_else(|| format!("{}-{}", D::ID_PREFIX, timestamp_id()));

    let entry = draft
        .into_entry(id, now_rfc3339())
        .ok_or_else(|| AppError::Validation("ChItemCode i ChItemName su obavezni".to_string()))?;

    collection
        .mutate(|entries| {
            if entries.iter().any(|e| Some(D::entry_code(e)) == code.as_deref()) {
                return Err(AppError::Validation(D::DUPLICATE_CODE.to_string()));
            }
            if let Some(id) = &explicit_id {
                if entries.iter().any(|e| e.id() == id) {
                    return Err(AppError::Validation(D::DUPLICATE_ID.to_string()));
                }
            }
            entries.push(entry.clone());
            Ok(())
        })
        .await?;

    Ok(entry)
}

/// Add every draft whose id and code are not already taken.
///
/// Drafts earlier in the batch count as taken too. Drafts without a code or
/// name are skipped.
pub async fn import_entries<D: CatalogDraft>(
    collection: &Collection<D::Entry>,
    drafts: Vec<D>,
) -> Result<ImportReport, AppError> {
    let batch_stamp = timestamp_id();
    let created_at = now_rfc3339();

    collection
        .mutate(|entries| {
            let mut report = ImportReport::default();

            for draft in drafts {
                let taken = draft
                    .draft_id()
                    .is_some_and(|id| entries.iter().any(|e| e.id() == id))
                    || draft
                        .draft_code()
                        .is_some_and(|code| entries.iter().any(|e| D::entry_code(e) == code));
                if taken {
                    report.skipped += 1;
                    continue;
                }

                let id = draft.draft_id().map(str::to_string).unwrap_or_else(|| {
                    format!("{}-{}-{}", D::ID_PREFIX, batch_stamp, report.added)
                });
                match draft.into_entry(id, created_at.clone()) {
                    Some(entry) => {
                        entries.push(entry);
                        report.added += 1;
                    }
                    None => report.skipped += 1,
                }
            }

            Ok(report)
        })
        .await
}

impl DataStore {
    pub async fn create_operation(&self, draft: NewOperation) -> Result<OperationTemplate, AppError> {
        create_entry(&self.operations, draft).await
    }

    pub async fn import_operations(
        &self,
        drafts: Vec<NewOperation>,
    ) -> Result<ImportReport, AppError> {
        import_entries(&self.operations, drafts).await
    }

    pub async fn create_spare_part(
        &self,
        draft: NewSparePart,
    ) -> Result<SparePartTemplate, AppError> {
        create_entry(&self.spare_parts, draft).await
    }

    pub async fn import_spare_parts(
        &self,
        drafts: Vec<NewSparePart>,
    ) -> Result<ImportReport, AppError> {
        import_entries(&self.spare_parts, drafts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn op(code: &str, name: &str) -> NewOperation {
        NewOperation {
            id: None,
            code: Some(code.to_string()),
            name: Some(name.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_import_counts_added_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        let items = vec![
            op("OP-001", "postoji"),
            op("OP-100", "Nova operacija 1"),
            op("OP-002", "postoji"),
            op("OP-101", "Nova operacija 2"),
            op("OP-102", "Nova operacija 3"),
        ];

        let report = store.import_operations(items).await.unwrap();
        assert_eq!(report, ImportReport { added: 3, skipped: 2 });
        assert_eq!(store.operations.get().await.len(), 9);
    }

    #[tokio::test]
    async fn test_import_dedupes_within_batch() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        let mut with_id = NewSparePart {
            id: Some("1".to_string()),
            code: Some("RD-900".to_string()),
            name: Some("Ventil".to_string()),
            unit: None,
        };
        let report = store
            .import_spare_parts(vec![
                with_id.clone(),
                NewSparePart {
                    id: None,
                    code: Some("RD-900".to_string()),
                    name: Some("Ventil".to_string()),
                    unit: Some("par".to_string()),
                },
                NewSparePart {
                    id: None,
                    code: Some("RD-900".to_string()),
                    name: Some("Ventil".to_string()),
                    unit: None,
                },
            ])
            .await
            .unwrap();
        // id "1" is taken by a seeded part
        assert_eq!(report, ImportReport { added: 1, skipped: 2 });

        with_id.id = Some("new-id".to_string());
        with_id.code = Some("RD-901".to_string());
        store.import_spare_parts(vec![with_id]).await.unwrap();
        let part = store
            .spare_parts
            .get()
            .await
            .into_iter()
            .find(|p| p.id == "new-id")
            .unwrap();
        assert_eq!(part.unit, DEFAULT_UNIT);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_code_and_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        let dup_code = store.create_operation(op("OP-003", "Again")).await;
        assert!(matches!(dup_code, Err(AppError::Validation(msg)) if msg == NewOperation::DUPLICATE_CODE));

        let mut dup_id = op("OP-500", "Nova");
        dup_id.id = Some("4".to_string());
        let result = store.create_operation(dup_id).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == NewOperation::DUPLICATE_ID));

        let created = store.create_operation(op("OP-500", "Nova")).await.unwrap();
        assert!(created.id.starts_with("OP-"));
        assert_eq!(created.description, "");
    }

    #[tokio::test]
    async fn test_create_requires_code_and_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();

        let result = store
            .create_spare_part(NewSparePart {
                code: Some("RD-777".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
