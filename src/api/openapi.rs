//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        version = "0.1.0",
        description = "Library Lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::liveness,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::borrow_summary,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBookRequest,
            crate::models::book::UpdateBookRequest,
            books::BookListResponse,
            books::BookResponse,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowPayload,
            crate::models::borrow::BorrowSummary,
            borrows::BorrowResponse,
            borrows::BorrowSummaryResponse,
            // Health
            health::LivenessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness endpoint"),
        (name = "books", description = "Book catalog management"),
        (name = "borrows", description = "Borrowing workflow and reporting")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
