use super::model::book::{Book, BookDraft};
use super::model::id::BookId;

/// 永続化の抽象。Infra層が実装する。
///
/// update / delete は該当行が無くてもエラーにしない。
pub trait CatalogRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// テーブルが無ければ作成する（冪等）。
    fn initialize(&self) -> Result<(), Self::Error>;

    fn list_all(&self) -> Result<Vec<Book>, Self::Error>;

    /// title または author に `query` を部分文字列として含むBook（大文字小文字を区別）。
    fn search(&self, query: &str) -> Result<Vec<Book>, Self::Error>;

    fn get_by_id(&self, id: BookId) -> Result<Option<Book>, Self::Error>;

    fn create(&self, draft: &BookDraft) -> Result<BookId, Self::Error>;

    fn update(&self, id: BookId, draft: &BookDraft) -> Result<(), Self::Error>;

    fn delete(&self, id: BookId) -> Result<(), Self::Error>;
}
