use crate::domain::model::book::{Book, BookDraft};
use crate::domain::model::id::BookId;
use crate::domain::repository::CatalogRepository;

use super::error::AppError;

/// カタログに対するユースケース。
/// Repositoryの結果を分類する（存在しないID → BookNotFound、その他 → Storage）。
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// テーブルを用意する。起動時に一度呼ぶ。
    pub fn initialize(&self) -> Result<(), AppError> {
        tracing::info!("creating books table");
        self.repo.initialize().map_err(Self::storage)?;
        tracing::info!("books table ready");
        Ok(())
    }

    pub fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.repo.list_all().map_err(Self::storage)
    }

    /// 空文字列は全件に一致する。
    pub fn search_books(&self, query: &str) -> Result<Vec<Book>, AppError> {
        self.repo.search(query).map_err(Self::storage)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book, AppError> {
        self.repo
            .get_by_id(id)
            .map_err(Self::storage)?
            .ok_or(AppError::BookNotFound(id))
    }

    pub fn add_book(&self, draft: BookDraft) -> Result<BookId, AppError> {
        let id = self.repo.create(&draft).map_err(Self::storage)?;
        tracing::info!(%id, title = %draft.title, "book added");
        Ok(id)
    }

    /// 全可変フィールドを上書きする。存在しないIDは何もしない。
    pub fn update_book(&self, id: BookId, draft: BookDraft) -> Result<(), AppError> {
        self.repo.update(id, &draft).map_err(Self::storage)?;
        tracing::info!(%id, "book updated");
        Ok(())
    }

    /// 存在しないIDは何もしない。
    pub fn delete_book(&self, id: BookId) -> Result<(), AppError> {
        self.repo.delete(id).map_err(Self::storage)?;
        tracing::info!(%id, "book deleted");
        Ok(())
    }

    // --- private ---

    fn storage(e: R::Error) -> AppError {
        tracing::error!(error = %e, "store operation failed");
        AppError::Storage(Box::new(e))
    }
}
