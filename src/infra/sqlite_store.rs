use std::path::{Path, PathBuf};

use rusqlite::limits::Limit;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::model::book::{Book, BookDraft};
use crate::domain::model::id::BookId;
use crate::domain::repository::CatalogRepository;

#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    #[error("cannot open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    author TEXT,
    year INTEGER
);";

const SELECT_BOOKS: &str = "SELECT id, title, author, year FROM books";

const SEARCH_BY_LIKE: &str = r"WHERE title LIKE ?1 ESCAPE '\' OR author LIKE ?1 ESCAPE '\'";

const SEARCH_BY_INSTR: &str = "WHERE instr(title, ?1) > 0 OR instr(author, ?1) > 0";

/// SQLiteによるCatalogRepository実装。
/// 1操作 = 1接続。接続は操作の終わりにDropで閉じる（エラー経路も含む）。
pub struct SqliteCatalogRepository {
    path: PathBuf,
}

impl SqliteCatalogRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, SqliteStoreError> {
        let conn = Connection::open(&self.path).map_err(|source| SqliteStoreError::Open {
            path: self.path.clone(),
            source,
        })?;
        // LIKE はデフォルトでASCIIの大文字小文字を無視する
        conn.execute_batch("PRAGMA case_sensitive_like = ON;")?;
        Ok(conn)
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    type Error = SqliteStoreError;

    fn initialize(&self) -> Result<(), Self::Error> {
        let conn = self.connect()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Book>, Self::Error> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{SELECT_BOOKS} ORDER BY id"))?;
        let books = stmt
            .query_map([], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn search(&self, query: &str) -> Result<Vec<Book>, Self::Error> {
        let conn = self.connect()?;
        let pattern = format!("%{}%", escape_like(query));
        let max_pattern = conn.limit(Limit::SQLITE_LIMIT_LIKE_PATTERN_LENGTH);
        // 上限を超えるLIKEパターンはSQLiteが拒否するため、instrで同じ部分文字列判定をする
        let over_limit = usize::try_from(max_pattern).map_or(true, |max| pattern.len() > max);
        let (filter, value) = if over_limit {
            (SEARCH_BY_INSTR, query.to_string())
        } else {
            (SEARCH_BY_LIKE, pattern)
        };
        let mut stmt = conn.prepare(&format!("{SELECT_BOOKS} {filter} ORDER BY id"))?;
        let books = stmt
            .query_map(params![value], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn get_by_id(&self, id: BookId) -> Result<Option<Book>, Self::Error> {
        let conn = self.connect()?;
        let book = conn
            .query_row(
                &format!("{SELECT_BOOKS} WHERE id = ?1"),
                params![id.get()],
                row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn create(&self, draft: &BookDraft) -> Result<BookId, Self::Error> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO books (title, author, year) VALUES (?1, ?2, ?3)",
            params![draft.title, draft.author, draft.year],
        )?;
        Ok(BookId::new(conn.last_insert_rowid()))
    }

    fn update(&self, id: BookId, draft: &BookDraft) -> Result<(), Self::Error> {
        let conn = self.connect()?;
        let rows = conn.execute(
            "UPDATE books SET title = ?1, author = ?2, year = ?3 WHERE id = ?4",
            params![draft.title, draft.author, draft.year, id.get()],
        )?;
        tracing::debug!(%id, rows, "update executed");
        Ok(())
    }

    fn delete(&self, id: BookId) -> Result<(), Self::Error> {
        let conn = self.connect()?;
        let rows = conn.execute("DELETE FROM books WHERE id = ?1", params![id.get()])?;
        tracing::debug!(%id, rows, "delete executed");
        Ok(())
    }
}

/// NULL列は空文字列 / 0 として読む。
fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    let id: i64 = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    let author: Option<String> = row.get(2)?;
    let year: Option<i64> = row.get(3)?;
    Ok(Book::new(
        BookId::new(id),
        BookDraft::new(
            title.unwrap_or_default(),
            author.unwrap_or_default(),
            year.unwrap_or_default(),
        ),
    ))
}

/// LIKEのワイルドカードをエスケープし、入力をリテラルな部分文字列として扱う。
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
