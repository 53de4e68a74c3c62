use crate::{
    document::context::GenerationContext,
    host::api::{Created, HandleId, Host, HostError, HostResult, PageId},
    resources::budget::ResourceKind,
    resources::tracker::ReleaseBatch,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Why a wrapped creation produced nothing.
pub enum CreateError {
    /// The page budget for this kind is spent.
    #[error("{0} budget exhausted")]
    Budget(ResourceKind),

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl CreateError {
    /// Whether the failure should abort the page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Host(e) if e.is_fatal())
    }
}

/// Scoped construction of one page.
///
/// Opening a session resets the page budget and creates the page. Every creation goes through
/// the session, which reserves budget, calls the host and registers the returned handle. When
/// the session ends, either through [`PageSession::finish`] or by being dropped on any early
/// exit, every tracked handle is released.
pub struct PageSession<'a, H: Host + ?Sized> {
    host: &'a mut H,
    ctx: &'a mut GenerationContext,
    page: PageId,
    finished: bool,
}

impl<'a, H: Host + ?Sized> PageSession<'a, H> {
    /// Reset the page budget and ask the host for a new page.
    pub fn open(host: &'a mut H, ctx: &'a mut GenerationContext) -> HostResult<Self> {
        ctx.budget.reset();
        if !ctx.tracker.is_empty() {
            // Left over from a session that was leaked with `mem::forget`.
            tracing::warn!(tracked = ctx.tracker.len(), "flushing handles from a previous page");
            let batch_size = ctx.flush_batch_size;
            ctx.tracker.release_all(batch_size, &mut *host);
        }

        let created = host.add_page()?;
        ctx.tracker.track(created.handle, &mut *host);
        tracing::debug!(page = created.id.0, "page opened");
        Ok(Self {
            host,
            ctx,
            page: created.id,
            finished: false,
        })
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    /// Direct host access for setters on already created elements.
    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    pub fn context(&self) -> &GenerationContext {
        &*self.ctx
    }

    /// Reserve `count` units of `kind` on this page.
    pub fn reserve(&mut self, kind: ResourceKind, count: u32) -> bool {
        self.ctx.budget.try_reserve(kind, count)
    }

    /// Reserve `units` elements, then create and track.
    pub fn create<I, F>(&mut self, units: u32, create: F) -> Result<I, CreateError>
    where
        F: FnOnce(&mut H, PageId) -> HostResult<Created<I>>,
    {
        if !self.reserve(ResourceKind::Element, units) {
            return Err(CreateError::Budget(ResourceKind::Element));
        }
        Ok(self.create_reserved(create)?)
    }

    /// Create and track without reserving; the caller already holds the reservation, or the
    /// object does not count against the element budget.
    pub fn create_reserved<I, F>(&mut self, create: F) -> HostResult<I>
    where
        F: FnOnce(&mut H, PageId) -> HostResult<Created<I>>,
    {
        let created = create(&mut *self.host, self.page)?;
        self.track(created.handle);
        Ok(created.id)
    }

    /// Register a handle obtained through [`PageSession::host`].
    pub fn track(&mut self, handle: HandleId) {
        if let Some(batch) = self.ctx.tracker.track(handle, &mut *self.host) {
            tracing::debug!(released = batch.len(), "auto-released oldest handles");
        }
    }

    /// Release the `n` oldest tracked handles now.
    pub fn release_oldest(&mut self, n: usize) -> ReleaseBatch {
        self.ctx.tracker.release_oldest(n, &mut *self.host)
    }

    /// End the page, releasing every tracked handle.
    pub fn finish(mut self) -> Vec<ReleaseBatch> {
        self.flush()
    }

    fn flush(&mut self) -> Vec<ReleaseBatch> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        let batch_size = self.ctx.flush_batch_size;
        let batches = self.ctx.tracker.release_all(batch_size, &mut *self.host);
        tracing::debug!(page = self.page.0, batches = batches.len(), "page closed");
        batches
    }
}

impl<H: Host + ?Sized> Drop for PageSession<'_, H> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/session.rs"]
mod tests;
