//! # Handler chain
//!
//! Runs middleware and handlers for each message:
//! middleware before (in order, any false stops everything) → handler before (in order) →
//! handler handle until Stop/Reply → handler after (reverse) → middleware after (reverse).
//!
//! Middleware always runs ahead of every handler, so a gate installed as the first middleware
//! sees each message before any feature handler. The chain is assembled once and then shared
//! read-only; nothing can be added after [`HandlerChain::build`].

use chanbot_core::{Handler, HandlerResponse, Message, Middleware, Result};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

struct Named<T: ?Sized> {
    name: String,
    inner: Arc<T>,
}

/// Builder collecting middleware and handlers in registration order.
#[derive(Default)]
pub struct HandlerChainBuilder {
    middleware: Vec<Named<dyn Middleware>>,
    handlers: Vec<Named<dyn Handler>>,
}

impl HandlerChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware (runs before every handler; after in reverse).
    pub fn add_middleware(mut self, name: &str, middleware: Arc<dyn Middleware>) -> Self {
        debug!(middleware = %name, "Registering middleware");
        self.middleware.push(Named {
            name: name.to_string(),
            inner: middleware,
        });
        self
    }

    /// Appends a handler (runs in order; first Stop/Reply ends the handle phase).
    pub fn add_handler(mut self, name: &str, handler: Arc<dyn Handler>) -> Self {
        debug!(handler = %name, "Registering handler");
        self.handlers.push(Named {
            name: name.to_string(),
            inner: handler,
        });
        self
    }

    pub fn build(self) -> HandlerChain {
        info!(
            middleware = self.middleware.len(),
            handlers = self.handlers.len(),
            "Handler chain built"
        );
        HandlerChain {
            middleware: Arc::from(self.middleware),
            handlers: Arc::from(self.handlers),
        }
    }
}

/// Immutable chain of middleware and handlers. Cloning shares the same registrations.
#[derive(Clone)]
pub struct HandlerChain {
    middleware: Arc<[Named<dyn Middleware>]>,
    handlers: Arc<[Named<dyn Handler>]>,
}

impl HandlerChain {
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder::new()
    }

    /// Middleware names in execution order.
    pub fn middleware_names(&self) -> Vec<&str> {
        self.middleware.iter().map(|m| m.name.as_str()).collect()
    }

    /// Handler names in execution order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_str()).collect()
    }

    /// True when both chains share the same registrations.
    pub fn same_registrations(&self, other: &HandlerChain) -> bool {
        Arc::ptr_eq(&self.handlers, &other.handlers) && Arc::ptr_eq(&self.middleware, &other.middleware)
    }

    /// Runs the full chain for one message. Returns Stop if a middleware or handler `before`
    /// refused the message, otherwise the first Stop/Reply from the handle phase, or Continue.
    ///
    /// A handler error ends the handle phase; after hooks still run with Stop, then the error is
    /// returned.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, "step: handler_chain started");

        for mw in self.middleware.iter() {
            if !mw.inner.before(message).await? {
                info!(middleware = %mw.name, "step: middleware before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
            debug!(middleware = %mw.name, "step: middleware before done");
        }

        for h in self.handlers.iter() {
            if !h.inner.before(message).await? {
                info!(handler = %h.name, "step: handler before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        let mut handle_error = None;
        for h in self.handlers.iter() {
            let response = match h.inner.handle(message).await {
                Ok(response) => response,
                Err(e) => {
                    error!(handler = %h.name, error = %e, "step: handler handle failed");
                    final_response = HandlerResponse::Stop;
                    handle_error = Some(e);
                    break;
                }
            };
            debug!(handler = %h.name, response = ?response, "step: handler handle done");
            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    info!(handler = %h.name, "step: handle phase ended by handler");
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue => {}
            }
        }

        // After hooks see every message that reached the handle phase, failed ones included.
        for h in self.handlers.iter().rev() {
            h.inner.after(message, &final_response).await?;
        }
        for mw in self.middleware.iter().rev() {
            mw.inner.after(message, &final_response).await?;
        }

        if let Some(e) = handle_error {
            return Err(e);
        }
        info!(message_id = %message.id, "step: handler_chain finished");
        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
