//! Collection scanning.

use schoolsync_store::{Document, DocumentStore, StoreError};

/// Interpret an operator-supplied per-collection cap; zero means unbounded.
pub fn cap_to_limit(cap: usize) -> Option<usize> {
    (cap > 0).then_some(cap)
}

/// Snapshot at most `limit` documents of `collection`.
///
/// The snapshot is taken before any write of the pass, so a pass never sees
/// its own repairs. The cap is enforced here even if a store returns more.
pub fn scan_collection<S>(
    store: &S,
    collection: &str,
    limit: Option<usize>,
) -> Result<Vec<Document>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let limit = limit.filter(|n| *n > 0);
    let mut documents = store.list_documents(collection, limit)?;
    if let Some(limit) = limit {
        documents.truncate(limit);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolsync_store::{MemoryStore, Patch};

    struct OversharingStore(Vec<Document>);

    impl DocumentStore for OversharingStore {
        fn list_documents(
            &self,
            _collection: &str,
            _limit: Option<usize>,
        ) -> Result<Vec<Document>, StoreError> {
            Ok(self.0.clone())
        }

        fn merge_write(
            &mut self,
            _collection: &str,
            _id: &str,
            _patch: &Patch,
        ) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn zero_cap_is_unbounded() {
        assert_eq!(cap_to_limit(0), None);
        assert_eq!(cap_to_limit(5), Some(5));
    }

    #[test]
    fn cap_limits_examined_documents() {
        let mut store = MemoryStore::new();
        store.insert_all(
            "grades",
            (0..10).map(|i| Document::new(format!("n{i:02}"))),
        );
        let docs = scan_collection(&store, "grades", Some(3)).expect("scan should succeed");
        assert_eq!(docs.len(), 3);
        assert_eq!(
            scan_collection(&store, "grades", Some(0))
                .expect("scan should succeed")
                .len(),
            10
        );
    }

    #[test]
    fn cap_is_enforced_when_store_ignores_it() {
        let store = OversharingStore(vec![Document::new("a"), Document::new("b")]);
        let docs = scan_collection(&store, "any", Some(1)).expect("scan should succeed");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn unreachable_store_is_an_error() {
        let store = MemoryStore::unreachable();
        assert!(matches!(
            scan_collection(&store, "accounts", None),
            Err(StoreError::Unreachable(_))
        ));
    }
}
