//! Harvest stages
//!
//! Units of work (one profession label, one discovery query, one record
//! lookup) that fail after retries are logged and skipped. Configuration
//! errors and failed batch writes end the run.

pub mod discovery;
pub mod fields;
pub mod harvester;
pub mod orchestrator;
pub mod uploader;

pub use discovery::{discover, run_discovery, Candidate, DiscoveryOptions};
pub use harvester::{run_harvest, HarvestOptions, PersonRow};
pub use orchestrator::{run_orchestration, OrchestrateOptions, OrchestrationReport};
pub use uploader::{run_upload, UploadOptions};
