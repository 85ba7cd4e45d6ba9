//! # Category Repository

use std::sync::Arc;

use tracing::info;

use bizdesk_core::{BusinessSegment, Category, CoreError, CoreResult, ValidationError};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct CategoryRepository {
    categories: Arc<SnapshotCell<Vec<Category>>>,
}

impl CategoryRepository {
    pub fn new(categories: Arc<SnapshotCell<Vec<Category>>>) -> Self {
        CategoryRepository { categories }
    }

    /// Optionally restricted to one segment.
    pub fn list(&self, segment: Option<BusinessSegment>) -> CoreResult<Vec<Category>> {
        self.categories.read(|all| {
            all.iter()
                .filter(|c| segment.map_or(true, |s| c.segment == s))
                .cloned()
                .collect()
        })
    }

    /// Names are unique per segment, ignoring case.
    pub fn add(&self, name: &str, segment: BusinessSegment) -> CoreResult<Category> {
        let category = Category::new(name, segment)?;
        let added = self.categories.update(|all| {
            let taken = all.iter().any(|c| {
                c.segment == segment && c.name.to_lowercase() == category.name.to_lowercase()
            });
            if taken {
                return Err(ValidationError::Duplicate {
                    field: "category".to_string(),
                    value: category.name.clone(),
                }
                .into());
            }
            all.push(category.clone());
            Ok(category)
        })?;
        info!(category_id = %added.id, name = %added.name, "Category added");
        Ok(added)
    }

    pub fn remove(&self, id: &str) -> CoreResult<Category> {
        self.categories.update(|all| {
            let pos = all
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()))?;
            Ok(all.remove(pos))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{MemoryStorage, StorageKey};
    use crate::LocalStore;
    use bizdesk_core::{BusinessSegment, CoreError};
    use std::sync::Arc;

    #[test]
    fn test_duplicate_name_in_segment() {
        let store = LocalStore::in_memory();
        let repo = store.categories();
        repo.add("Brunch", BusinessSegment::Restaurant).unwrap();
        assert!(repo.add("brunch", BusinessSegment::Restaurant).is_err());
        assert!(repo.add("Brunch", BusinessSegment::Hotel).is_ok());
    }

    #[test]
    fn test_categories_survive_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let first = LocalStore::with_storage(storage.clone());
        first.categories().add("Brunch", BusinessSegment::Restaurant).unwrap();
        first.categories().add("Spa", BusinessSegment::Hotel).unwrap();
        let before = first.categories().list(None).unwrap();

        let second = LocalStore::with_storage(storage.clone());
        assert_eq!(second.categories().list(None).unwrap(), before);
        assert!(storage.raw(StorageKey::Categories).is_some());
    }

    #[test]
    fn test_list_by_segment_and_remove() {
        let store = LocalStore::in_memory();
        let repo = store.categories();
        let spa = repo.add("Spa", BusinessSegment::Hotel).unwrap();
        assert!(repo
            .list(Some(BusinessSegment::Hotel))
            .unwrap()
            .iter()
            .all(|c| c.segment == BusinessSegment::Hotel));

        repo.remove(&spa.id).unwrap();
        assert!(matches!(
            repo.remove(&spa.id),
            Err(CoreError::CategoryNotFound(_))
        ));
    }
}
