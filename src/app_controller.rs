use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils::{script_profile, ScriptProfile};
use crate::layout::capacity::{Capacity, RegionConfig};
use crate::layout::engine::{LayoutEngine, OverflowAnalysis};
use crate::relationship::{ChainOutcome, LoggingCollaborator, MotherCollaborator, RelationshipManager};

// @module: Application controller for label text analysis

/// Analysis of one text file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File that was analyzed
    pub path: PathBuf,
    /// Capacity, wrapped lines and chunks
    pub analysis: OverflowAnalysis,
    /// Script composition of the text
    pub scripts: ScriptProfile,
}

/// Totals of a folder run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderSummary {
    pub processed: usize,
    pub overflowing: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Engine built from the configuration
    engine: LayoutEngine,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let engine = LayoutEngine::from_config(&config);
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Region described by the configuration, with the configured content type
    pub fn region(&self, name: &str) -> RegionConfig {
        self.config
            .layout
            .region_config(name, &self.config.overflow.content_type)
    }

    /// Capacity of the configured region
    pub fn capacity(&self) -> Capacity {
        self.engine.capacity(&self.region("master"))
    }

    /// Analyze a text against the configured region
    pub fn analyze_text(&self, text: &str) -> OverflowAnalysis {
        self.engine.analyze(&self.region("master"), text)
    }

    /// Analyze one text file
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<FileReport> {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }

        let text = FileManager::read_to_string(path)?;
        let analysis = self.analyze_text(&text);
        let scripts = script_profile(&text);

        if analysis.has_overflow {
            info!(
                "{:?}: {} lines, needs {} additional region(s)",
                path,
                analysis.lines.len(),
                analysis.additional_regions
            );
        } else {
            info!("{:?}: {} lines, fits", path, analysis.lines.len());
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            analysis,
            scripts,
        })
    }

    /// Analyze every `.txt` file below a directory
    pub fn analyze_folder<P: AsRef<Path>>(&self, input_dir: P) -> Result<(Vec<FileReport>, FolderSummary)> {
        let start_time = Instant::now();
        let input_dir = input_dir.as_ref();
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_files(input_dir, "txt")?;
        if files.is_empty() {
            return Err(anyhow!("No text files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("=> "));

        let mut reports = Vec::with_capacity(files.len());
        let mut summary = FolderSummary::default();

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(file_name.clone());

            match self.analyze_file(file) {
                Ok(report) => {
                    summary.processed += 1;
                    if report.analysis.has_overflow {
                        summary.overflowing += 1;
                    }
                    reports.push(report);
                }
                Err(e) => {
                    error!("Error analyzing {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("done");
        info!(
            "Folder analysis completed in {}: {} processed, {} overflowing, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.overflowing,
            summary.failed
        );

        Ok((reports, summary))
    }

    /// Run chain management for a text file against a logging collaborator
    ///
    /// When `state_out` is given the resulting relationship state is written
    /// there as JSON.
    pub async fn run_chain<P: AsRef<Path>>(
        &self,
        input_file: P,
        master_id: &str,
        state_out: Option<PathBuf>,
    ) -> Result<ChainOutcome> {
        let collaborator: Arc<dyn MotherCollaborator> = Arc::new(LoggingCollaborator);
        self.run_chain_with(collaborator, input_file, master_id, state_out).await
    }

    /// Run chain management with a specific collaborator
    pub async fn run_chain_with<P: AsRef<Path>>(
        &self,
        collaborator: Arc<dyn MotherCollaborator>,
        input_file: P,
        master_id: &str,
        state_out: Option<PathBuf>,
    ) -> Result<ChainOutcome> {
        let text = FileManager::read_to_string(input_file.as_ref())?;
        let manager = RelationshipManager::with_engine(collaborator, self.engine.clone());
        let region = self.region(master_id);

        let outcome = manager
            .handle_chain_management(master_id, &text, &region, |r| self.engine.capacity(r))
            .await;

        if outcome.unplaced_chunks > 0 {
            warn!("{} chunk(s) of {} could not be placed", outcome.unplaced_chunks, master_id);
        }

        if let Some(path) = state_out {
            FileManager::write_json(&path, &manager.export_state())?;
            info!("Relationship state written to {:?}", path);
        }

        Ok(outcome)
    }

    fn format_duration(duration: Duration) -> String {
        let total_ms = duration.as_millis();
        if total_ms < 1000 {
            format!("{}ms", total_ms)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
