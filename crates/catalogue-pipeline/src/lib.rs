//! Catalogue Pipeline
//!
//! Turns free text into at most one stored catalogue entry.
//!
//! ```text
//! Received → Extracting → Validating → CheckingDuplicate → Writing → Completed
//! ```
//!
//! Each stage is a separate crate; this one wires them together and owns
//! what spans the whole run:
//!
//! - `DuplicateCheckedWriter`: lookup-then-insert with the store as final
//!   arbiter on races
//! - `PipelineError`: one error type per run, each variant with a kind and
//!   an HTTP status
//! - `CatalogueConfig`: TOML plus environment configuration
//! - `telemetry`: tracing setup
//!
//! # Example
//!
//! ```no_run
//! use catalogue_pipeline::{telemetry, CatalogueConfig, Pipeline};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! telemetry::init_tracing();
//!
//! let config = CatalogueConfig::from_file("catalogue.toml")?.with_env_overrides();
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let output = pipeline
//!     .run_bounded("GPT-4 is a large multimodal model released by OpenAI on 2023-03-14.")
//!     .await?;
//! println!("Stored {} ({} units)", output.entity.name, output.consumption_units);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
pub mod telemetry;
mod writer;

pub use config::{
    CatalogueConfig, ConfigError, PipelineSettings, ProviderSettings, StoreSettings, ENV_API_KEY,
    ENV_DATABASE, ENV_MODEL,
};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineOutput};
pub use writer::{DuplicateCheckedWriter, WriteError};
