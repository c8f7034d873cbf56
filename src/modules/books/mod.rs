pub mod catalog;
pub mod error;
pub mod models;
pub mod routes;
pub mod tracker;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookbank_kernel::{InitCtx, Module};

pub use error::LendingError;
pub use models::{Book, NewCopies};
pub use tracker::AvailabilityTracker;

/// Books module: catalog browsing, borrowing, and restocking
pub struct BooksModule {
    tracker: Arc<AvailabilityTracker>,
}

impl BooksModule {
    pub fn new(tracker: Arc<AvailabilityTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.tracker))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.database.seed_catalog {
            let inserted = self
                .tracker
                .seed(catalog::starter_catalog())
                .await
                .context("failed to seed the starter catalog")?;
            tracing::info!(module = self.name(), inserted, "starter catalog seeded");
        }
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(tracker: Arc<AvailabilityTracker>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(tracker))
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn openapi_fragment() -> serde_json::Value {
    let book = serde_json::json!({ "$ref": "#/components/schemas/Book" });
    let lending = serde_json::json!({ "$ref": "#/components/schemas/LendingResponse" });

    serde_json::json!({
        "paths": {
            "/catalog": {
                "get": {
                    "summary": "List the catalog",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Every book ordered by title", serde_json::json!({
                            "type": "array",
                            "items": book.clone()
                        })),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/catalog/{title}": {
                "get": {
                    "summary": "Fetch one book",
                    "tags": ["Books"],
                    "parameters": [{
                        "name": "title",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": json_response("The book", book.clone()),
                        "404": error_response("Book not found")
                    }
                }
            },
            "/request": {
                "post": {
                    "summary": "Request to borrow a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": {
                            "$ref": "#/components/schemas/RequestBook"
                        } } }
                    },
                    "responses": {
                        "200": json_response("Copy lent, or days until available", lending.clone()),
                        "400": error_response("Book title is required"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/add": {
                "post": {
                    "summary": "Add copies of a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": {
                            "$ref": "#/components/schemas/AddBook"
                        } } }
                    },
                    "responses": {
                        "200": json_response("Copies added to an existing book", lending.clone()),
                        "201": json_response("Book added", lending),
                        "400": error_response("Validation error"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "Unique title of the book" },
                        "author": { "type": "string" },
                        "category": { "type": "string" },
                        "copies": { "type": "integer", "minimum": 0 },
                        "requestedAt": {
                            "type": "string",
                            "format": "date-time",
                            "description": "When the exhaustion countdown was last armed"
                        },
                        "daysAvailable": { "type": "integer", "minimum": 0, "maximum": 15 }
                    },
                    "required": ["title", "author", "category", "copies", "daysAvailable"]
                },
                "RequestBook": {
                    "type": "object",
                    "properties": { "title": { "type": "string" } },
                    "required": ["title"]
                },
                "AddBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "category": { "type": "string" },
                        "copies": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["title", "author", "category", "copies"]
                },
                "LendingResponse": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "book": book
                    },
                    "required": ["message"]
                }
            }
        }
    })
}
