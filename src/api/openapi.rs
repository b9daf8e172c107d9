//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Notes
        crate::routes::notes::create_note,
        crate::routes::notes::update_note,
        crate::routes::notes::read_notes,
        crate::routes::notes::read_single_note,
        crate::routes::notes::delete_note,
        // Authentication
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::read_current_user,
        // Health
        crate::routes::health::health_check,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::Note,
        crate::models::NoteIn,
        crate::models::UserIn,
        crate::models::UserOut,
        crate::models::Token,
        crate::routes::auth::LoginForm,
        crate::routes::notes::MessageResponse,
        crate::routes::health::HealthResponse,
        crate::routes::error::ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Notes", description = "Note CRUD operations"),
        (name = "Authentication", description = "User registration and password login"),
        (name = "Health", description = "Service health"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Notes REST API",
        description = "Async REST API for notes backed by PostgreSQL",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        let http = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .build();
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new)
            .add_security_scheme("bearer_auth", SecurityScheme::Http(http));
    }
}
