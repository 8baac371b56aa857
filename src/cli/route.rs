//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::artifact::{validate_encoded, ArtifactStore};
use crate::artifact::store::read_raw;
use crate::audit::{audit, repair_all};
use crate::batch::{BatchReport, BatchRunner, TokioPacer};
use crate::catalog::{Catalog, Specification, TitleTable};
use crate::cli::help::{command_name, contacts_service};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_audit, format_batch_report, format_catalog, format_repair, format_validation,
    OutputFormat,
};
use crate::config::{resolve_path, ConfigLoader, ForgeConfig};
use crate::error::ForgeError;
use crate::generation::{GenerationClient, PromptBuilder};
use crate::provider::ProviderFactory;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: workspace root and validated configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ForgeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ForgeError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(workspace_root, config)
    }

    /// Create run context from an already loaded configuration.
    pub fn from_config(workspace_root: PathBuf, config: ForgeConfig) -> Result<Self, ForgeError> {
        config.ensure_valid()?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ForgeError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = name, "Command started");

        let result = self.execute_inner(command);
        match &result {
            Ok(_) => info!(
                command = name,
                duration_ms = started.elapsed().as_millis() as u64,
                "Command finished"
            ),
            Err(e) => warn!(command = name, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ForgeError> {
        if contacts_service(command) {
            debug!(
                model = %self.config.provider.model,
                api_key_env = %self.config.provider.api_key_env,
                "Command contacts the generative service"
            );
        }

        match command {
            Commands::Batch {
                start,
                count,
                delay,
                format,
            } => self.handle_batch(*start, *count, *delay, format),
            Commands::All { yes, delay, format } => self.handle_all(*yes, *delay, format),
            Commands::Generate { id, format } => self.handle_generate(id, format),
            Commands::Validate { path, format } => self.handle_validate(path, format),
            Commands::Audit { root, format } => self.handle_audit(root.as_deref(), format),
            Commands::Repair {
                root,
                titles,
                dry_run,
                format,
            } => self.handle_repair(root.as_deref(), titles.as_deref(), *dry_run, format),
            Commands::Catalog { format } => self.handle_catalog(format),
        }
    }

    fn handle_batch(
        &self,
        start: usize,
        count: Option<usize>,
        delay: Option<u64>,
        format: &str,
    ) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let catalog = self.load_catalog()?;
        let count = count.unwrap_or(self.config.batch.default_count);
        let specs = catalog.slice(start, count)?;
        let report = self.run_specs(specs, self.delay(delay))?;
        format_batch_report(&report, format)
    }

    fn handle_all(&self, yes: bool, delay: Option<u64>, format: &str) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let catalog = self.load_catalog()?;
        let delay = self.delay(delay);

        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(confirmation_prompt(catalog.len(), delay))
                .default(false)
                .interact()
                .map_err(|e| ForgeError::ConfigError(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Batch cancelled".to_string());
            }
        }

        let report = self.run_specs(catalog.specifications(), delay)?;
        format_batch_report(&report, format)
    }

    fn handle_generate(&self, id: &str, format: &str) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let catalog = self.load_catalog()?;
        let spec = catalog.get(id).ok_or_else(|| {
            ForgeError::CatalogError(format!("No specification with id '{}' in the catalog", id))
        })?;
        let report = self.run_specs(std::slice::from_ref(spec), Duration::ZERO)?;
        format_batch_report(&report, format)
    }

    fn handle_validate(&self, path: &Path, format: &str) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let path = resolve_path(&self.workspace_root, path);
        let raw = read_raw(&path)?;
        let result = validate_encoded(&raw, &self.config.validation);
        format_validation(&path, &result, format)
    }

    fn handle_audit(&self, root: Option<&Path>, format: &str) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let root = self.scan_root(root);
        let results = audit(&root, &self.config.audit)?;

        // Expected headings are a bonus; a missing title table is not an error here.
        let titles_path = resolve_path(&self.workspace_root, &self.config.batch.titles);
        let titles = if titles_path.is_file() {
            Some(TitleTable::load(&titles_path)?)
        } else {
            None
        };
        format_audit(&results, titles.as_ref(), format)
    }

    fn handle_repair(
        &self,
        root: Option<&Path>,
        titles: Option<&Path>,
        dry_run: bool,
        format: &str,
    ) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let root = self.scan_root(root);
        let titles_path = resolve_path(
            &self.workspace_root,
            titles.unwrap_or(self.config.batch.titles.as_path()),
        );
        let titles = TitleTable::load(&titles_path)?;
        let records = repair_all(&root, &titles, &self.config.audit, dry_run)?;
        format_repair(&records, dry_run, format)
    }

    fn handle_catalog(&self, format: &str) -> Result<String, ForgeError> {
        let format = OutputFormat::parse(format)?;
        let catalog = self.load_catalog()?;
        format_catalog(&catalog, format)
    }

    fn load_catalog(&self) -> Result<Catalog, ForgeError> {
        Catalog::load(&resolve_path(&self.workspace_root, &self.config.batch.catalog))
    }

    fn delay(&self, override_secs: Option<u64>) -> Duration {
        Duration::from_secs(override_secs.unwrap_or(self.config.batch.delay_secs))
    }

    fn scan_root(&self, root: Option<&Path>) -> PathBuf {
        match root {
            Some(root) => resolve_path(&self.workspace_root, root),
            None => self.config.storage.root(&self.workspace_root),
        }
    }

    /// Build the generation client. Fails before any item work when the
    /// credential or standards file is unavailable.
    fn generation_client(&self) -> Result<GenerationClient, ForgeError> {
        let credential = self.config.provider.resolve_credential()?;
        let provider = ProviderFactory::create_client(&self.config.provider, credential)?;
        let standards = self.config.generation.load_standards(&self.workspace_root)?;
        let prompts = PromptBuilder::new(
            standards,
            self.config.validation.clone(),
            self.config.generation.domain_focus_percent,
        );
        Ok(GenerationClient::new(
            provider,
            prompts,
            self.config.provider.completion_options(),
        ))
    }

    fn run_specs(&self, specs: &[Specification], delay: Duration) -> Result<BatchReport, ForgeError> {
        let client = self.generation_client()?;
        let runner = BatchRunner::new(
            ArtifactStore::new(self.config.storage.root(&self.workspace_root)),
            self.config.storage.directories(),
            self.config.validation.clone(),
        );

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ForgeError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        Ok(rt.block_on(runner.run_batch(&client, &TokioPacer, specs, delay)))
    }
}

/// Prompt shown before running the whole catalog.
pub fn confirmation_prompt(count: usize, delay: Duration) -> String {
    let minimum = delay.saturating_mul(count.saturating_sub(1) as u32);
    format!(
        "Generate all {} notebooks? This takes at least {} (plus generation time)",
        count,
        format_duration(minimum)
    )
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
