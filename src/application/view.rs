use std::fmt::Write;

use serde::Serialize;

use crate::domain::model::book::Book;

/// 検索結果ビュー用のデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub books: Vec<Book>,
}

/// ハンドラがレンダラへ渡すデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    List { books: Vec<Book> },
    Search(SearchResult),
    Show { book: Book },
    Edit { book: Book },
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template formatting failed")]
    Format(#[from] std::fmt::Error),

    #[error("render error: {0}")]
    Render(String),
}

/// View → HTML文書。外部コラボレータとして差し替え可能。
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &View) -> Result<String, ViewError>;
}

/// 最小限のHTMLレンダラ。マークアップは契約の一部ではない。
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl ViewRenderer for HtmlRenderer {
    fn render(&self, view: &View) -> Result<String, ViewError> {
        let mut body = String::new();
        let title = match view {
            View::List { books } => {
                Self::render_list(books, &mut body)?;
                "Books".to_string()
            }
            View::Search(result) => {
                Self::render_search(result, &mut body)?;
                format!("Search: {}", result.query)
            }
            View::Show { book } => {
                Self::render_show(book, &mut body)?;
                book.title().to_string()
            }
            View::Edit { book } => {
                Self::render_edit(book, &mut body)?;
                format!("Edit: {}", book.title())
            }
        };
        Self::page(&title, &body)
    }
}

impl HtmlRenderer {
    fn page(title: &str, body: &str) -> Result<String, ViewError> {
        let mut buf = String::new();
        writeln!(buf, "<!DOCTYPE html>")?;
        writeln!(buf, "<html>")?;
        writeln!(
            buf,
            "<head><meta charset=\"utf-8\"><title>{}</title></head>",
            escape_html(title)
        )?;
        writeln!(buf, "<body>")?;
        buf.push_str(body);
        writeln!(buf, "</body>")?;
        writeln!(buf, "</html>")?;
        Ok(buf)
    }

    fn render_list(books: &[Book], buf: &mut String) -> Result<(), ViewError> {
        writeln!(buf, "<h1>Books</h1>")?;
        writeln!(
            buf,
            "<form action=\"/search\" method=\"get\"><input name=\"query\"><button>Search</button></form>"
        )?;
        Self::render_table(books, buf)?;
        writeln!(buf, "<h2>Add a book</h2>")?;
        writeln!(buf, "<form action=\"/add\" method=\"post\">")?;
        Self::render_fields(None, buf)?;
        writeln!(buf, "<button>Add</button>")?;
        writeln!(buf, "</form>")?;
        Ok(())
    }

    fn render_search(result: &SearchResult, buf: &mut String) -> Result<(), ViewError> {
        writeln!(
            buf,
            "<h1>Results for &quot;{}&quot;</h1>",
            escape_html(&result.query)
        )?;
        if result.books.is_empty() {
            writeln!(buf, "<p>No books found.</p>")?;
        } else {
            Self::render_table(&result.books, buf)?;
        }
        writeln!(buf, "<p><a href=\"/\">Back to list</a></p>")?;
        Ok(())
    }

    fn render_show(book: &Book, buf: &mut String) -> Result<(), ViewError> {
        writeln!(buf, "<h1>{}</h1>", escape_html(book.title()))?;
        writeln!(buf, "<dl>")?;
        writeln!(buf, "<dt>Author</dt><dd>{}</dd>", escape_html(book.author()))?;
        writeln!(buf, "<dt>Year</dt><dd>{}</dd>", book.year())?;
        writeln!(buf, "</dl>")?;
        writeln!(
            buf,
            "<p><a href=\"/edit?id={id}\">Edit</a> <a href=\"/\">Back to list</a></p>",
            id = book.id()
        )?;
        Ok(())
    }

    fn render_edit(book: &Book, buf: &mut String) -> Result<(), ViewError> {
        writeln!(buf, "<h1>Edit book</h1>")?;
        writeln!(buf, "<form action=\"/update\" method=\"post\">")?;
        writeln!(buf, "<input type=\"hidden\" name=\"id\" value=\"{}\">", book.id())?;
        Self::render_fields(Some(book), buf)?;
        writeln!(buf, "<button>Save</button>")?;
        writeln!(buf, "</form>")?;
        writeln!(buf, "<p><a href=\"/\">Cancel</a></p>")?;
        Ok(())
    }

    fn render_table(books: &[Book], buf: &mut String) -> Result<(), ViewError> {
        writeln!(buf, "<table>")?;
        writeln!(buf, "<tr><th>Title</th><th>Author</th><th>Year</th><th></th></tr>")?;
        for book in books {
            writeln!(
                buf,
                "<tr><td><a href=\"/book?id={id}\">{title}</a></td><td>{author}</td><td>{year}</td>\
                 <td><a href=\"/edit?id={id}\">Edit</a> <a href=\"/delete?id={id}\">Delete</a></td></tr>",
                id = book.id(),
                title = escape_html(book.title()),
                author = escape_html(book.author()),
                year = book.year(),
            )?;
        }
        writeln!(buf, "</table>")?;
        Ok(())
    }

    /// 入力欄。`book` があれば現在値で埋める。
    fn render_fields(book: Option<&Book>, buf: &mut String) -> Result<(), ViewError> {
        let (title, author, year) = match book {
            Some(b) => (
                escape_html(b.title()),
                escape_html(b.author()),
                b.year().to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        writeln!(buf, "<label>Title <input name=\"title\" value=\"{title}\"></label>")?;
        writeln!(buf, "<label>Author <input name=\"author\" value=\"{author}\"></label>")?;
        writeln!(buf, "<label>Year <input name=\"year\" value=\"{year}\"></label>")?;
        Ok(())
    }
}

/// HTMLのテキスト・属性値として安全な形にエスケープする。
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
