//! Feature areas of the site.
//!
//! Pages, users and documents each implement [`Module`] and are mounted onto
//! one [`Router`] by [`crate::app`]. A module owns whatever its handlers share,
//! usually the template registry, and moves a clone into every route closure.
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use fare::templates::{self, Templates};
//! use fare::{Module, Router};
//!
//! pub struct AboutModule {
//!     templates: Arc<Templates>,
//! }
//!
//! impl Module for AboutModule {
//!     fn name(&self) -> &'static str {
//!         "about"
//!     }
//!
//!     fn routes(&self, router: &mut Router) {
//!         let t = Arc::clone(&self.templates);
//!         router.get("/about/", move |_ctx| {
//!             let t = Arc::clone(&t);
//!             async move { t.page(hyper::StatusCode::OK, templates::HOME, &serde_json::json!({})) }
//!         });
//!     }
//! }
//! ```

use crate::router::Router;

/// A group of routes mounted together.
pub trait Module: Send + Sync {
    /// Short name used in logs when the module is mounted.
    fn name(&self) -> &'static str;

    /// Add this module's routes.
    fn routes(&self, router: &mut Router);
}
