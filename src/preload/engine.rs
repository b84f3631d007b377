//! Document-route pipeline: dispatch, bundle, inject.

use std::sync::Arc;

use crate::http::response::ResponseBuffer;
use crate::preload::dispatch::Dispatcher;
use crate::preload::inject::{document_response, plain_document_response};
use crate::preload::request::PreloadRequest;
use crate::shell::DocumentShell;

/// Renders document routes with their preloaded data.
#[derive(Clone)]
pub struct Preloader {
    dispatcher: Dispatcher,
    shell: Arc<DocumentShell>,
    staggered: bool,
}

impl Preloader {
    /// `staggered` serves the bare shell and skips dispatch entirely.
    pub fn new(dispatcher: Dispatcher, shell: Arc<DocumentShell>, staggered: bool) -> Self {
        Self {
            dispatcher,
            shell,
            staggered,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn shell(&self) -> &DocumentShell {
        &self.shell
    }

    /// Produce the HTML response for a document route.
    pub async fn render(&self, request: &PreloadRequest) -> ResponseBuffer {
        if self.staggered {
            return plain_document_response(&self.shell);
        }

        let bundle = self.dispatcher.collect(request).await;
        document_response(&self.shell, &bundle, request.request_target())
    }
}
