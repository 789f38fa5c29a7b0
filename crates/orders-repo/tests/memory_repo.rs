#![cfg(feature = "memory")]

mod common;

use orders_repo::memory::InMemoryRepo;

#[tokio::test]
async fn memory_repo_crud_flow() {
    common::crud_flow(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_handles_missing_rows() {
    common::missing_rows(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_pages_after_sorting() {
    common::paging_sorts_whole_collection(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_search() {
    common::search_is_case_insensitive(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_bulk_operations() {
    common::bulk_operations(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_stats() {
    common::stats_summary(&InMemoryRepo::new()).await;
}

#[tokio::test]
async fn memory_repo_never_reuses_ids() {
    common::ids_are_never_reused(&InMemoryRepo::new()).await;
}
