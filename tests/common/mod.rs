//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use book_catalog::application::service::CatalogService;
use book_catalog::application::view::{View, ViewError, ViewRenderer};
use book_catalog::domain::model::book::{Book, BookDraft};
use book_catalog::domain::model::id::BookId;
use book_catalog::domain::repository::CatalogRepository;
use book_catalog::infra::sqlite_store::SqliteCatalogRepository;

// =============================================================================
// InMemoryRepo — テスト用リポジトリ
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("in-memory store error")]
pub struct InMemoryError;

#[derive(Default)]
struct InMemoryState {
    next_id: i64,
    rows: BTreeMap<BookId, Book>,
}

/// SQL不要のインメモリリポジトリ。採番はAUTOINCREMENTと同じく再利用しない。
pub struct InMemoryRepo {
    state: Mutex<InMemoryState>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
        }
    }
}

impl CatalogRepository for InMemoryRepo {
    type Error = InMemoryError;

    fn initialize(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Book>, Self::Error> {
        Ok(self.state.lock().unwrap().rows.values().cloned().collect())
    }

    fn search(&self, query: &str) -> Result<Vec<Book>, Self::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .values()
            .filter(|b| b.matches(query))
            .cloned()
            .collect())
    }

    fn get_by_id(&self, id: BookId) -> Result<Option<Book>, Self::Error> {
        Ok(self.state.lock().unwrap().rows.get(&id).cloned())
    }

    fn create(&self, draft: &BookDraft) -> Result<BookId, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = BookId::new(state.next_id);
        state.rows.insert(id, Book::new(id, draft.clone()));
        Ok(id)
    }

    fn update(&self, id: BookId, draft: &BookDraft) -> Result<(), Self::Error> {
        if let Some(book) = self.state.lock().unwrap().rows.get_mut(&id) {
            book.apply(draft.clone());
        }
        Ok(())
    }

    fn delete(&self, id: BookId) -> Result<(), Self::Error> {
        self.state.lock().unwrap().rows.remove(&id);
        Ok(())
    }
}

// =============================================================================
// FailingRepo — 全操作が失敗するリポジトリ
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("database is locked")]
pub struct LockedError;

pub struct FailingRepo;

impl CatalogRepository for FailingRepo {
    type Error = LockedError;

    fn initialize(&self) -> Result<(), Self::Error> {
        Err(LockedError)
    }

    fn list_all(&self) -> Result<Vec<Book>, Self::Error> {
        Err(LockedError)
    }

    fn search(&self, _query: &str) -> Result<Vec<Book>, Self::Error> {
        Err(LockedError)
    }

    fn get_by_id(&self, _id: BookId) -> Result<Option<Book>, Self::Error> {
        Err(LockedError)
    }

    fn create(&self, _draft: &BookDraft) -> Result<BookId, Self::Error> {
        Err(LockedError)
    }

    fn update(&self, _id: BookId, _draft: &BookDraft) -> Result<(), Self::Error> {
        Err(LockedError)
    }

    fn delete(&self, _id: BookId) -> Result<(), Self::Error> {
        Err(LockedError)
    }
}

// =============================================================================
// FailingRenderer — 常に失敗するレンダラ
// =============================================================================

pub struct FailingRenderer;

impl ViewRenderer for FailingRenderer {
    fn render(&self, _view: &View) -> Result<String, ViewError> {
        Err(ViewError::Render("template not found".into()))
    }
}

// =============================================================================
// Catalog helpers
// =============================================================================

/// 初期化済みのSQLiteカタログ。TempDirはテスト終了まで保持すること。
pub fn sqlite_catalog() -> (tempfile::TempDir, CatalogService<SqliteCatalogRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let svc = CatalogService::new(SqliteCatalogRepository::new(dir.path().join("books.db")));
    svc.initialize().unwrap();
    (dir, svc)
}

pub fn memory_catalog() -> CatalogService<InMemoryRepo> {
    CatalogService::new(InMemoryRepo::new())
}

/// 標準的なテスト用カタログ:
/// ```text
/// 1. Dune / Herbert / 1965
/// 2. Foundation / Asimov / 1951
/// ```
pub fn seed<R: CatalogRepository>(svc: &CatalogService<R>) -> (BookId, BookId) {
    let dune = svc.add_book(BookDraft::new("Dune", "Herbert", 1965)).unwrap();
    let foundation = svc.add_book(BookDraft::new("Foundation", "Asimov", 1951)).unwrap();
    (dune, foundation)
}

pub fn ids(books: &[Book]) -> Vec<BookId> {
    let mut ids: Vec<BookId> = books.iter().map(|b| b.id()).collect();
    ids.sort();
    ids
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
