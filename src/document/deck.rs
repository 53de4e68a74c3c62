use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    document::assembler::DocumentAssembler,
    document::content::ContentSpec,
    document::context::GenerationContext,
    document::page::PageDescriptor,
    foundation::config::EngineConfig,
    foundation::error::{SlidewrightError, SlidewrightResult},
    foundation::math::Fnv1a64,
    host::api::Host,
    resources::tracker::TrackerStats,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// A requested page the host refused to create. Generation moved on to the next one.
pub struct FailedPage {
    pub index: usize,
    pub title: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Outcome of one generation run.
pub struct DeckReport {
    /// One descriptor per page that was created, in page order.
    pub pages: Vec<PageDescriptor>,
    /// Pages that could not be created, in page order.
    pub failed_pages: Vec<FailedPage>,
    /// Handle-tracker counters for the whole run.
    pub tracker: TrackerStats,
    /// Stable hash of `pages`. Two runs over the same content against fresh hosts agree.
    pub fingerprint: u64,
    /// Why generation stopped before the last page, if it did.
    pub aborted: Option<String>,
    /// Where the host saved the document.
    pub saved_to: Option<PathBuf>,
}

impl DeckReport {
    /// Total diagnostics across pages.
    pub fn skipped_count(&self) -> usize {
        self.pages.iter().map(|p| p.skipped.len()).sum()
    }
}

/// Builds a deck page by page with one [`GenerationContext`] for the run.
#[derive(Debug)]
pub struct DeckGenerator {
    assembler: DocumentAssembler,
    ctx: GenerationContext,
}

impl DeckGenerator {
    pub fn new<H: Host + ?Sized>(config: EngineConfig, host: &H) -> Self {
        let ctx = GenerationContext::new(&config);
        Self {
            assembler: DocumentAssembler::for_host(config, host),
            ctx,
        }
    }

    pub fn assembler(&self) -> &DocumentAssembler {
        &self.assembler
    }

    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    /// Assemble `pages` strictly in order, one page finished before the next begins.
    ///
    /// A page the host refuses to create is listed in [`DeckReport::failed_pages`] and the run
    /// continues with the next one. A host that becomes unavailable ends the run; the report
    /// keeps every page built so far and names the cause in [`DeckReport::aborted`].
    #[tracing::instrument(skip_all, fields(pages = pages.len()))]
    pub fn generate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pages: &[ContentSpec],
    ) -> SlidewrightResult<DeckReport> {
        let mut built = Vec::with_capacity(pages.len());
        let mut failed_pages = Vec::new();
        let mut aborted = None;

        for (index, spec) in pages.iter().enumerate() {
            let remaining = pages.len() - index - 1;
            let desc = match self.assembler.assemble_page(host, &mut self.ctx, index, spec) {
                Ok(desc) => desc,
                Err(SlidewrightError::Host(err)) if err.is_fatal() => {
                    tracing::error!(page = index, remaining, error = %err, "stopping deck");
                    aborted = Some(err.to_string());
                    break;
                }
                Err(SlidewrightError::Host(err)) => {
                    tracing::warn!(page = index, error = %err, "page not created; continuing");
                    failed_pages.push(FailedPage {
                        index,
                        title: spec.title.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
                Err(other) => return Err(other),
            };
            let fatal = desc.fatal.clone();
            built.push(desc);
            if let Some(msg) = fatal {
                tracing::error!(page = index, remaining, "stopping deck");
                aborted = Some(msg);
                break;
            }
        }

        let fingerprint = fingerprint_pages(&built)?;
        let report = DeckReport {
            pages: built,
            failed_pages,
            tracker: self.ctx.tracker().stats(),
            fingerprint,
            aborted,
            saved_to: None,
        };
        tracing::info!(
            pages = report.pages.len(),
            failed = report.failed_pages.len(),
            skipped = report.skipped_count(),
            fingerprint = report.fingerprint,
            "deck generated"
        );
        Ok(report)
    }

    /// [`DeckGenerator::generate`], then ask the host to persist the document.
    ///
    /// An aborted run is not saved. The parent directory of `path` is created if missing.
    pub fn generate_and_save<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pages: &[ContentSpec],
        path: impl AsRef<Path>,
    ) -> SlidewrightResult<DeckReport> {
        let mut report = self.generate(host, pages)?;
        if report.aborted.is_some() {
            tracing::warn!("generation aborted; document not saved");
            return Ok(report);
        }
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create save directory '{}'", dir.display()))?;
        }
        host.save(path)?;
        report.saved_to = Some(path.to_path_buf());
        Ok(report)
    }
}

fn fingerprint_pages(pages: &[PageDescriptor]) -> SlidewrightResult<u64> {
    let bytes = serde_json::to_vec(pages)
        .map_err(|e| SlidewrightError::serde(format!("serialize page descriptors: {e}")))?;
    let mut h = Fnv1a64::new_default();
    h.write_u64(pages.len() as u64);
    h.write_bytes(&bytes);
    Ok(h.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/document/deck.rs"]
mod tests;
