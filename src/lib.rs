//! fare - document sharing and staff permission management.
//!
//! fare is a small web application built from these parts:
//!
//! - **Config**: Layered configuration (file → env → CLI)
//! - **Database**: libsql abstraction supporting local and remote databases
//! - **Auth**: JWT identity for the requesting user
//! - **Permission**: the gate deciding who may change whose `staff_member` flag
//! - **Router**: HTTP routing with path parameters
//! - **Server**: Hyper-based HTTP server
//! - **Modules**: pages, users and documents, each registering its routes
//!
//! # Example
//!
//! ```ignore
//! use fare::config::{ConfigLoader, Overrides};
//!
//! #[tokio::main]
//! async fn main() -> fare::Result<()> {
//!     let config = ConfigLoader::default().load(None, &Overrides::default())?;
//!
//!     let db = fare::db::connect(&config.database.url).await?;
//!     fare::db::migrate(&fare::db::connection(&db)?).await?;
//!
//!     fare::server::run(config, db, fare::app()?).await
//! }
//! ```

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod logging;
pub mod module;
pub mod pages;
pub mod permission;
pub mod response;
pub mod router;
pub mod server;
pub mod templates;
pub mod urls;
pub mod users;

// Re-export main types at crate root
pub use config::{Config, ConfigLoader};
pub use db::Handle as DbHandle;
pub use error::{Error, Result};
pub use module::Module;
pub use permission::can_act_on;
pub use router::{Context, Router, RouterHandle};
pub use users::User;

/// Every route of the application, ready to serve.
pub fn app() -> Result<Arc<RouterHandle>> {
    let templates = Arc::new(templates::Templates::new()?);

    let modules: [Box<dyn Module>; 3] = [
        Box::new(pages::PagesModule::new(Arc::clone(&templates))),
        Box::new(users::UsersModule::new(Arc::clone(&templates))),
        Box::new(documents::DocumentsModule::new(templates)),
    ];

    let mut router = Router::new();
    for module in &modules {
        router.mount(module.as_ref());
    }
    Ok(router.into_handle())
}
