//! Discovery → upload orchestration
//!
//! Preflight validates the requested clusters, a stale CSV is removed before
//! discovery, and upload is skipped when nothing was found, when asked to, or
//! when no Airtable store is available.

use super::discovery::{run_discovery, DiscoveryOptions};
use super::uploader::{run_upload, UploadOptions};
use crate::dictionaries::DiscoveryDictionaries;
use crate::wikidata::{QueryTemplate, SparqlEndpoint};
use nomen_common::airtable::RecordStore;
use nomen_common::{Error, Result, RunSummary};
use std::io::ErrorKind;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct OrchestrateOptions {
    pub discovery: DiscoveryOptions,
    pub skip_upload: bool,
    pub lang: Option<String>,
    pub dry_run: bool,
}

/// What the orchestration did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestrationReport {
    /// Candidate rows written by discovery
    pub candidates: usize,
    /// Upload outcome, `None` when upload was skipped
    pub upload: Option<RunSummary>,
}

/// Run discovery, then upload its CSV into `store` when one is given
pub async fn run_orchestration(
    endpoint: &dyn SparqlEndpoint,
    dicts: &DiscoveryDictionaries,
    template: &QueryTemplate,
    store: Option<&dyn RecordStore>,
    options: &OrchestrateOptions,
) -> Result<OrchestrationReport> {
    let clusters = &options.discovery.clusters;
    if clusters.is_empty() {
        return Err(Error::Config("No clusters requested".to_string()));
    }
    dicts.validate_clusters(clusters)?;
    info!(clusters = ?clusters, "Clusters OK");

    let outfile = &options.discovery.outfile;
    match std::fs::remove_file(outfile) {
        Ok(()) => debug!(path = %outfile.display(), "Removed stale candidates"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut report = OrchestrationReport {
        candidates: run_discovery(endpoint, dicts, template, &options.discovery).await?,
        upload: None,
    };

    if report.candidates == 0 {
        warn!("No candidate data produced; upload skipped");
        return Ok(report);
    }
    if options.skip_upload {
        info!("skip-upload set; stopping after discovery");
        return Ok(report);
    }
    let Some(store) = store else {
        warn!("Airtable credentials missing; upload skipped");
        return Ok(report);
    };

    let upload = UploadOptions {
        csv: outfile.clone(),
        lang: options.lang.clone(),
        dry_run: options.dry_run,
    };
    report.upload = Some(run_upload(store, &upload).await?);
    info!("Orchestration complete");
    Ok(report)
}
