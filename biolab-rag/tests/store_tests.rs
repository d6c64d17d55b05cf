//! Contract tests for the in-memory vector store: query ordering,
//! collision policy, dimensionality enforcement, and the two-phase
//! promote.

use std::collections::HashMap;

use biolab_rag::error::RagError;
use biolab_rag::inmemory::InMemoryVectorStore;
use biolab_rag::vectorstore::{Entry, VectorStore};
use proptest::prelude::*;

fn entry(id: &str, embedding: Vec<f32>) -> Entry {
    Entry {
        id: id.to_string(),
        embedding,
        document: format!("document {id}"),
        metadata: HashMap::from([("titre".to_string(), id.to_string())]),
    }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate an entry with a normalized embedding.
fn arb_entry(dim: usize) -> impl Strategy<Value = Entry> {
    ("[a-z]{3,8}", arb_normalized_embedding(dim)).prop_map(|(id, embedding)| entry(&id, embedding))
}

/// For any set of stored entries, querying returns at most `k` matches
/// ordered by ascending cosine distance.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn matches_ordered_ascending_and_bounded_by_k(
            entries in proptest::collection::vec(arb_entry(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (matches, unique_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();

                // Deduplicate by id to satisfy the collision policy
                let mut deduped: HashMap<String, Entry> = HashMap::new();
                for e in &entries {
                    deduped.entry(e.id.clone()).or_insert_with(|| e.clone());
                }
                let unique: Vec<Entry> = deduped.into_values().collect();
                let count = unique.len();

                store.add("test", &unique).await.unwrap();
                (store.query("test", &query, k).await.unwrap(), count)
            });

            prop_assert!(matches.len() <= k);
            prop_assert!(matches.len() <= unique_count);

            for window in matches.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "matches not in ascending distance order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }
    }
}

#[tokio::test]
async fn add_rejects_duplicate_ids() {
    let store = InMemoryVectorStore::new();
    store.create_collection("analyses", 3).await.unwrap();
    store.add("analyses", &[entry("a", vec![1.0, 0.0, 0.0])]).await.unwrap();

    let err = store.add("analyses", &[entry("a", vec![0.0, 1.0, 0.0])]).await.unwrap_err();
    assert!(matches!(err, RagError::DuplicateId { .. }));
    assert_eq!(store.count("analyses").await.unwrap(), 1);
}

#[tokio::test]
async fn add_rejects_dimension_mismatch_without_partial_insert() {
    let store = InMemoryVectorStore::new();
    store.create_collection("analyses", 3).await.unwrap();

    let batch = [entry("a", vec![1.0, 0.0, 0.0]), entry("b", vec![1.0, 0.0])];
    let err = store.add("analyses", &batch).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2, .. }));

    // The valid entry of the failed batch must not have been stored
    assert_eq!(store.count("analyses").await.unwrap(), 0);
}

#[tokio::test]
async fn count_is_zero_for_absent_collection() {
    let store = InMemoryVectorStore::new();
    assert_eq!(store.count("missing").await.unwrap(), 0);
}

#[tokio::test]
async fn query_fails_for_absent_collection() {
    let store = InMemoryVectorStore::new();
    let err = store.query("missing", &[1.0, 0.0], 5).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStoreError { .. }));
}

#[tokio::test]
async fn query_prefers_closer_entries() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 2).await.unwrap();
    store
        .add(
            "docs",
            &[
                entry("aligned", vec![1.0, 0.0]),
                entry("diagonal", vec![1.0, 1.0]),
                entry("orthogonal", vec![0.0, 1.0]),
            ],
        )
        .await
        .unwrap();

    let matches = store.query("docs", &[1.0, 0.0], 2).await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "aligned");
    assert!(matches[0].distance.abs() < 1e-6);
    assert_eq!(matches[1].id, "diagonal");
}

#[tokio::test]
async fn promote_replaces_active_collection_and_drops_staging() {
    let store = InMemoryVectorStore::new();
    store.create_collection("active", 2).await.unwrap();
    store.add("active", &[entry("old", vec![1.0, 0.0])]).await.unwrap();

    store.create_collection("active__staging", 2).await.unwrap();
    store
        .add("active__staging", &[entry("new_a", vec![0.0, 1.0]), entry("new_b", vec![1.0, 1.0])])
        .await
        .unwrap();

    // The active collection keeps serving the old contents until promote
    assert_eq!(store.count("active").await.unwrap(), 1);

    store.promote("active__staging", "active").await.unwrap();

    assert_eq!(store.count("active").await.unwrap(), 2);
    assert_eq!(store.count("active__staging").await.unwrap(), 0);
    let matches = store.query("active", &[0.0, 1.0], 5).await.unwrap();
    assert!(matches.iter().all(|m| m.id != "old"));
}

#[tokio::test]
async fn promote_fails_when_staging_is_absent() {
    let store = InMemoryVectorStore::new();
    store.create_collection("active", 2).await.unwrap();
    let err = store.promote("active__staging", "active").await.unwrap_err();
    assert!(matches!(err, RagError::VectorStoreError { .. }));
    assert_eq!(store.count("active").await.unwrap(), 0);
}

#[tokio::test]
async fn metadata_lists_all_stored_maps() {
    let store = InMemoryVectorStore::new();
    store.create_collection("docs", 2).await.unwrap();
    store
        .add("docs", &[entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])])
        .await
        .unwrap();

    let mut titles: Vec<String> = store
        .metadata("docs")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m["titre"].clone())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["a", "b"]);

    assert!(store.metadata("missing").await.unwrap().is_empty());
}
