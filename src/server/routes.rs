use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use crate::book::{Book, BookColumn};
use crate::library::Library;
use crate::loan::BorrowOutcome;
use crate::search::{BookQuery, Range, SortOrder};
use crate::server::AppState;
use crate::storage::SqliteStore;
use crate::Error;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub press: Option<String>,
    pub category: Option<String>,
    pub year_min: Option<i64>,
    pub year_max: Option<i64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sort: Option<String>,
    pub desc: Option<bool>,
}

impl SearchParams {
    /// Filters, sort column and direction for this request
    pub fn into_search(self) -> crate::Result<(BookQuery, BookColumn, SortOrder)> {
        let sort = match self.sort.as_deref() {
            Some(name) => BookColumn::from_str(name)?,
            None => BookColumn::default(),
        };
        let query = BookQuery {
            title: self.title,
            author: self.author,
            press: self.press,
            category: self.category,
            year: Range::from_bounds(self.year_min, self.year_max),
            price: Range::from_bounds(self.price_min, self.price_max),
        };
        Ok((query, sort, SortOrder::from_descending(self.desc.unwrap_or(false))))
    }
}

#[derive(Deserialize)]
pub struct BorrowRequest {
    pub card_id: i64,
    pub book_id: i64,
    pub manager: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoanParams {
    pub card_id: i64,
    pub book_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub returned: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub borrowed: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

/// Map library errors onto HTTP statuses
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::BookNotFound(_) | Error::CardNotFound(_) => StatusCode::NOT_FOUND,
        Error::LoanConflict { .. } | Error::CardHasLoans(_) => StatusCode::CONFLICT,
        Error::InvalidColumn(_) | Error::InvalidCardType(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Run `action` against a library opened for this request on a blocking thread
async fn with_library<T, F>(state: &AppState, action: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Library) -> crate::Result<T> + Send + 'static,
{
    let path = state.database_path.clone();
    let options = state.options;

    let result = tokio::task::spawn_blocking(move || {
        let mut library = Library::new(SqliteStore::open(&path)?, options);
        let value = action(&mut library)?;
        library.close()?;
        Ok::<T, Error>(value)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Worker failed: {}", e)))?;

    result.map_err(|e| {
        let status = status_for(&e);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", e);
        }
        api_error(status, e.to_string())
    })
}

pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<Book>> {
    let (query, sort, order) = params
        .into_search()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let books = with_library(&state, move |library| library.search_books(&query, sort, order)).await?;
    Ok(Json(books))
}

pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BorrowRequest>,
) -> ApiResult<BorrowOutcome> {
    let outcome = with_library(&state, move |library| {
        let Some(manager) = library.authenticate_manager(&request.manager, &request.password)? else {
            return Ok(None);
        };
        library.borrow_book(request.card_id, request.book_id, manager.id).map(Some)
    })
    .await?;

    outcome
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Invalid manager credentials"))
}

pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(params): Json<LoanParams>,
) -> ApiResult<ReturnResponse> {
    let returned = with_library(&state, move |library| library.return_book(params.card_id, params.book_id)).await?;
    Ok(Json(ReturnResponse { returned }))
}

pub async fn loan_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoanParams>,
) -> ApiResult<StatusResponse> {
    let borrowed = with_library(&state, move |library| library.is_borrowed(params.card_id, params.book_id)).await?;
    Ok(Json(StatusResponse { borrowed }))
}

pub async fn borrowed_books(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> ApiResult<Vec<Book>> {
    let books = with_library(&state, move |library| {
        if !library.card_exists(card_id)? {
            return Err(Error::CardNotFound(card_id));
        }
        library.borrowed_books(card_id)
    })
    .await?;
    Ok(Json(books))
}
