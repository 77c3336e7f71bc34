//! Document uploads.

pub mod form;
pub mod model;
pub mod storage;
pub mod store;
pub mod views;

use std::sync::Arc;

use crate::module::Module;
use crate::router::Router;
use crate::templates::Templates;
use crate::urls;

pub use model::Document;

/// Routes under `/documents/`.
pub struct DocumentsModule {
    templates: Arc<Templates>,
}

impl DocumentsModule {
    pub fn new(templates: Arc<Templates>) -> Self {
        Self { templates }
    }
}

impl Module for DocumentsModule {
    fn name(&self) -> &'static str {
        "filesupload"
    }

    fn routes(&self, router: &mut Router) {
        let t = Arc::clone(&self.templates);
        router.get(urls::FILES_UPLOAD, move |ctx| views::upload(ctx, Arc::clone(&t)));
        let t = Arc::clone(&self.templates);
        router.post(urls::FILES_UPLOAD, move |ctx| views::upload(ctx, Arc::clone(&t)));
    }
}
