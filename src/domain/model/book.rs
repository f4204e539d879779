use serde::Serialize;

use super::id::{parse_integer, BookId};
use crate::domain::error::DomainError;

/// 作成・更新の入力値。IDは持たない（採番はストアの責務）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: i64,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// フォームの生の値から組み立てる。
    /// title / author は空でもよい。year は整数として解釈できなければエラー。
    pub fn from_form(title: &str, author: &str, year: &str) -> Result<Self, DomainError> {
        let year = parse_integer("year", year)?;
        Ok(Self::new(title, author, year))
    }
}

/// 永続化済みのBook。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    year: i64,
}

impl Book {
    pub fn new(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    /// title または author が `query` を含むか（大文字小文字を区別）。
    pub fn matches(&self, query: &str) -> bool {
        self.title.contains(query) || self.author.contains(query)
    }

    /// 可変フィールドを上書きする。IDは変わらない。
    pub fn apply(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.year = draft.year;
    }
}
