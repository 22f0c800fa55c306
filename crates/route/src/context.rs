//! Per request scratchpad shared by every matcher of one dispatch.

use crate::lens::{Morphism, Optic, Value};
use crate::matcher::{Halt, MatchResult};
use crate::request::Request;
use crate::{BodyError, LensError};
use bytes::Bytes;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// Owns one [`Request`] and everything matchers stage while recognizing it:
/// the wildcard captures of the route trie, the path cursor of segment
/// matchers and the [`Morphism`] of staged lens values.
#[derive(Debug)]
pub struct Context {
    request: Request,
    cursor: usize,
    values: Vec<String>,
    capture_base: usize,
    morphism: Morphism,
    payload: Option<Bytes>,
    body_limit: Option<usize>,
    cancellation: Option<CancellationToken>,
}

/// The restorable state of a [`Context`]: staged values, captures and path cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    arrows: usize,
    values: usize,
    cursor: usize,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            cursor: 0,
            values: Vec::with_capacity(4),
            capture_base: 0,
            morphism: Morphism::new(),
            payload: None,
            body_limit: None,
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Aborts a pending body read once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn set_cancellation(&mut self, token: Option<CancellationToken>) {
        self.cancellation = token;
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Wildcard captures of the route trie, in path order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn morphism(&self) -> &Morphism {
        &self.morphism
    }

    /// Parses `raw` with `optic` and stages the value; a parse failure is a `NoMatch`.
    pub fn put(&mut self, optic: &Optic, raw: &str) -> MatchResult {
        match optic.parse(raw) {
            Ok(value) => {
                self.stage(optic, value);
                Ok(())
            }
            Err(e) => {
                trace!(lens = optic.name(), cause = %e, "lens does not accept the input");
                Err(Halt::NoMatch)
            }
        }
    }

    /// Parses the capture at `index` of the current route lookup with `optic` and stages it.
    pub(crate) fn put_capture(&mut self, index: usize, optic: &Optic) -> MatchResult {
        let Some(raw) = self.values.get(self.capture_base + index) else {
            return Err(Halt::NoMatch);
        };
        match optic.parse(raw) {
            Ok(value) => {
                self.morphism.push(optic.clone(), value);
                Ok(())
            }
            Err(e) => {
                trace!(lens = optic.name(), cause = %e, "capture does not parse");
                Err(Halt::NoMatch)
            }
        }
    }

    pub fn stage(&mut self, optic: &Optic, value: Value) {
        self.morphism.push(optic.clone(), value);
    }

    /// Writes every staged value into `target`.
    pub fn decode<S: 'static>(&self, target: &mut S) -> Result<(), LensError> {
        self.morphism.apply(target)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { arrows: self.morphism.len(), values: self.values.len(), cursor: self.cursor }
    }

    /// Drops everything staged after `snapshot` was taken.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.morphism.truncate(snapshot.arrows);
        self.values.truncate(snapshot.values);
        self.cursor = snapshot.cursor;
    }

    /// Clears staged values, captures and the cached payload so the context can be reused.
    pub fn free(&mut self) {
        self.morphism.clear();
        self.values.clear();
        self.capture_base = 0;
        self.cursor = 0;
        self.payload = None;
        self.cancellation = None;
    }

    /// Frees the context and binds it to a new request.
    pub fn reset(&mut self, request: Request) {
        self.free();
        self.request = request;
    }

    /// Marks where the captures of the current route lookup start, returning the previous mark.
    pub(crate) fn replace_capture_base(&mut self, base: usize) -> usize {
        std::mem::replace(&mut self.capture_base, base)
    }

    pub(crate) fn path_and_values(&mut self) -> (&str, &mut Vec<String>) {
        (self.request.path(), &mut self.values)
    }

    /// The path segment under the cursor.
    pub fn next_segment(&self) -> Option<&str> {
        self.request.segments().get(self.cursor).map(String::as_str)
    }

    pub fn remaining_segments(&self) -> &[String] {
        self.request.segments().get(self.cursor..).unwrap_or_default()
    }

    pub fn advance(&mut self, segments: usize) {
        self.cursor = (self.cursor + segments).min(self.request.segments().len());
    }

    /// Reads the request body once and caches it, so every alternative of a
    /// co-product sees the same payload.
    pub async fn payload(&mut self) -> Result<Bytes, BodyError> {
        if let Some(payload) = &self.payload {
            return Ok(payload.clone());
        }

        let limit = self.body_limit;
        let body = self.request.body_mut();
        let bytes = match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(BodyError::Cancelled),
                    read = body.read_all(limit) => read?,
                }
            }
            None => body.read_all(limit).await?,
        };

        self.payload = Some(bytes.clone());
        Ok(bytes)
    }
}

/// A free list of contexts reused between requests.
///
/// Released contexts are freed first, so no later request observes prior data.
#[derive(Debug)]
pub struct ContextPool {
    free: Mutex<Vec<Context>>,
    capacity: usize,
    body_limit: Option<usize>,
}

impl ContextPool {
    pub fn new(capacity: usize) -> Self {
        Self { free: Mutex::new(Vec::with_capacity(capacity)), capacity, body_limit: None }
    }

    #[must_use]
    pub fn with_body_limit(mut self, limit: Option<usize>) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn acquire(&self, request: Request) -> Context {
        let pooled = self.free_list().pop();
        let mut ctx = match pooled {
            Some(mut ctx) => {
                ctx.reset(request);
                ctx
            }
            None => Context::new(request),
        };
        ctx.body_limit = self.body_limit;
        ctx
    }

    pub fn release(&self, mut ctx: Context) {
        ctx.free();
        ctx.request = Request::default();
        let mut free = self.free_list();
        if free.len() < self.capacity {
            free.push(ctx);
        }
    }

    pub fn idle(&self) -> usize {
        self.free_list().len()
    }

    // pooled contexts are always freed, so a panic while holding the lock leaves nothing half written
    fn free_list(&self) -> MutexGuard<'_, Vec<Context>> {
        self.free.lock().unwrap_or_else(|poisoned| {
            warn!("context pool lock was poisoned, recovering");
            self.free.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }
}
