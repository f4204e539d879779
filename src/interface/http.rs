//! HTTP Server for book-catalog
//!
//! HTTP (axum) <-> application::CatalogService / ViewRenderer
//!
//! 7 routes: / , /search, /book, /edit (GET) / /add, /update (POST) / /delete (any)

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{any, get, post},
    Form, Router,
};

use crate::application::error::AppError;
use crate::application::service::CatalogService;
use crate::application::view::{HtmlRenderer, SearchResult, View, ViewError, ViewRenderer};
use crate::config::ServerConfig;
use crate::domain::error::DomainError;
use crate::domain::model::book::BookDraft;
use crate::domain::model::id::BookId;
use crate::domain::repository::CatalogRepository;
use crate::infra::sqlite_store::SqliteCatalogRepository;

// =============================================================================
// Public entry point
// =============================================================================

/// ストアを初期化してHTTP Serverを起動する。初期化・bindの失敗は致命的。
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let catalog = CatalogService::new(SqliteCatalogRepository::new(&config.database));
    catalog.initialize().with_context(|| {
        format!(
            "failed to initialize catalog store at {}",
            config.database.display()
        )
    })?;

    let app = router(catalog, Arc::new(HtmlRenderer));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// ルーティングを組み立てる。ストアとレンダラは呼び出し側から注入する。
pub fn router<R>(catalog: CatalogService<R>, views: Arc<dyn ViewRenderer>) -> Router
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let state = AppState {
        catalog: Arc::new(catalog),
        views,
    };

    Router::new()
        .route("/", get(list_books::<R>))
        .route("/search", get(search_books::<R>))
        .route("/book", get(show_book::<R>))
        .route("/edit", get(edit_form::<R>))
        .route("/add", post(add_book::<R>).fallback(method_not_allowed))
        .route("/update", post(update_book::<R>).fallback(method_not_allowed))
        .route("/delete", any(delete_book::<R>))
        .with_state(state)
}

// =============================================================================
// State
// =============================================================================

struct AppState<R: CatalogRepository> {
    catalog: Arc<CatalogService<R>>,
    views: Arc<dyn ViewRenderer>,
}

impl<R: CatalogRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            views: Arc::clone(&self.views),
        }
    }
}

impl<R> AppState<R>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    /// 同期のストア操作をブロッキングスレッドで実行する。
    async fn call<T, F>(&self, op: F) -> Result<T, HttpError>
    where
        T: Send + 'static,
        F: FnOnce(&CatalogService<R>) -> Result<T, AppError> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        let result = tokio::task::spawn_blocking(move || op(&catalog))
            .await
            .map_err(|e| HttpError::Internal(format!("store task failed: {e}")))?;
        Ok(result?)
    }

    fn render(&self, view: &View) -> Result<Html<String>, HttpError> {
        Ok(Html(self.views.render(view)?))
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("{0}")]
    BadRequest(String),

    #[error("book not found: {0}")]
    NotFound(BookId),

    #[error("method not allowed: use POST")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for HttpError {
    fn from(e: DomainError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<AppError> for HttpError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Domain(e) => e.into(),
            AppError::BookNotFound(id) => Self::NotFound(id),
            other @ AppError::Storage(_) => Self::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for HttpError {
    fn from(e: QueryRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<FormRejection> for HttpError {
    fn from(e: FormRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<ViewError> for HttpError {
    fn from(e: ViewError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

// =============================================================================
// Request types
// =============================================================================

type Pairs = Vec<(String, String)>;

/// クエリ文字列・フォーム本文の値。
/// 同名キーは最初の値を使い、欠けたキーは空文字列として扱う。
#[derive(Debug, Default)]
struct Fields(Pairs);

impl Fields {
    fn from_query(query: Result<Query<Pairs>, QueryRejection>) -> Result<Self, HttpError> {
        let Query(pairs) = query?;
        Ok(Self(pairs))
    }

    /// POSTの値。本文を先に、クエリ文字列を後に見る。
    /// フォーム以外のContent-Typeでは本文を読まない。
    fn from_post(
        query: Result<Query<Pairs>, QueryRejection>,
        form: Result<Form<Pairs>, FormRejection>,
    ) -> Result<Self, HttpError> {
        let mut pairs = match form {
            Ok(Form(pairs)) => pairs,
            Err(FormRejection::InvalidFormContentType(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        pairs.extend(Self::from_query(query)?.0);
        Ok(Self(pairs))
    }

    fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    fn id(&self) -> Result<BookId, DomainError> {
        self.get("id").parse()
    }

    fn draft(&self) -> Result<BookDraft, DomainError> {
        BookDraft::from_form(self.get("title"), self.get("author"), self.get("year"))
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_books<R>(State(state): State<AppState<R>>) -> Result<Html<String>, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let books = state.call(|c| c.list_books()).await?;
    state.render(&View::List { books })
}

async fn search_books<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Html<String>, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let query = Fields::from_query(query)?.get("query").to_string();
    let books = {
        let query = query.clone();
        state.call(move |c| c.search_books(&query)).await?
    };
    state.render(&View::Search(SearchResult { query, books }))
}

async fn show_book<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Html<String>, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let id = Fields::from_query(query)?.id()?;
    let book = state.call(move |c| c.get_book(id)).await?;
    state.render(&View::Show { book })
}

/// 編集フローの1段目。現在値を埋めたフォームを返す（idはhiddenで往復する）。
async fn edit_form<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Html<String>, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let id = Fields::from_query(query)?.id()?;
    let book = state.call(move |c| c.get_book(id)).await?;
    state.render(&View::Edit { book })
}

async fn add_book<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Redirect, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let fields = Fields::from_post(query, form)?;
    tracing::debug!(
        title = fields.get("title"),
        author = fields.get("author"),
        year = fields.get("year"),
        "received add form"
    );
    let draft = fields.draft()?;
    state.call(move |c| c.add_book(draft)).await?;
    Ok(Redirect::to("/"))
}

/// 編集フローの2段目。サーバー側のセッションは無く、同じidで上書きする。
async fn update_book<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Redirect, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    let fields = Fields::from_post(query, form)?;
    tracing::debug!(
        id = fields.get("id"),
        title = fields.get("title"),
        author = fields.get("author"),
        year = fields.get("year"),
        "received update form"
    );
    let id = fields.id()?;
    let draft = fields.draft()?;
    state.call(move |c| c.update_book(id, draft)).await?;
    Ok(Redirect::to("/"))
}

/// 存在確認はしない。整数でないidはどの行にも一致しないため何もしない。
async fn delete_book<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Redirect, HttpError>
where
    R: CatalogRepository + Send + Sync + 'static,
{
    match Fields::from_query(query)?.id() {
        Ok(id) => state.call(move |c| c.delete_book(id)).await?,
        Err(e) => tracing::debug!(error = %e, "delete ignored"),
    }
    Ok(Redirect::to("/"))
}

async fn method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed
}
