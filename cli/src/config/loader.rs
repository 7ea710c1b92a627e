//! Simple CLI configuration loader for quickopen
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./quickopen.json or ./.quickopen/config.json
//! 3. Git repository root: <repo_root>/.quickopen/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/quickopen/config.json or the platform config dir
//! 5. Built-in defaults (no files)
//!
//! Environment variables (QUICKOPEN_SEARCH_PROGRAM, QUICKOPEN_MAX_RESULTS)
//! are applied on top of the file, and flags on top of both.

use anyhow::{anyhow, Context, Result};
use quickopen_core::PickerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Search and list settings understood by core
    #[serde(flatten)]
    pub picker: PickerConfig,
    /// Directories to search; `~` is expanded
    pub roots: Vec<String>,
    /// Command used to open the chosen file, e.g. "code -g"
    pub open_with: Option<String>,
}

/// Configuration after discovery, overrides and validation
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCliConfig {
    #[serde(flatten)]
    pub picker: PickerConfig,
    pub roots: Vec<PathBuf>,
    pub open_with: Option<String>,
    /// File the configuration came from, if any
    pub source: Option<PathBuf>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    roots_override: Vec<PathBuf>,
    search_program_override: Option<String>,
    max_results_override: Option<usize>,
    open_with_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            roots_override: Vec::new(),
            search_program_override: None,
            max_results_override: None,
            open_with_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Replace the configured roots
    pub fn with_roots_override(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots_override = roots;
        self
    }

    /// Set search program override
    pub fn with_search_program_override(mut self, program: String) -> Self {
        self.search_program_override = Some(program);
        self
    }

    /// Set per-root result cap override
    pub fn with_max_results_override(mut self, max: usize) -> Self {
        self.max_results_override = Some(max);
        self
    }

    /// Set open command override
    pub fn with_open_with_override(mut self, command: String) -> Self {
        self.open_with_override = Some(command);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ResolvedCliConfig> {
        // Step 1: Find and load base configuration
        let (mut config, source) = if let Some(override_path) = &self.config_override {
            // Use explicit config override
            let (config, source) = self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (config, Some(source))
        } else {
            // Search in priority order
            match self.search_and_load().await? {
                Some((config, source)) => (config, Some(source)),
                None => (RawConfig::default(), None),
            }
        };

        // Step 2: Apply environment overrides
        self.apply_env(&mut config)?;

        // Step 3: Apply flag overrides
        if let Some(program) = &self.search_program_override {
            config.picker.search_program = program.clone();
        }
        if let Some(max) = self.max_results_override {
            config.picker.max_results_per_root = max;
        }
        if let Some(command) = &self.open_with_override {
            config.open_with = Some(command.clone());
        }

        // Step 4: Resolve to final config
        self.resolve_config(config, source)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<(RawConfig, PathBuf)>> {
        let cwd = std::env::current_dir()?;
        let mut candidates = vec![
            cwd.join("quickopen.json"),
            cwd.join(".quickopen").join("config.json"),
        ];

        if let Some(git_root) = self.find_git_root(&cwd) {
            candidates.push(git_root.join(".quickopen").join("config.json"));
        }

        if let Some(config_dir) = self.get_xdg_config_dir() {
            candidates.push(config_dir.join("quickopen").join("config.json"));
        }

        for path in candidates {
            if path.is_file() {
                let config = self.load_file(&path).await?;
                return Ok(Some((config, path)));
            }
        }

        Ok(None)
    }

    /// Apply QUICKOPEN_* environment variables
    fn apply_env(&self, config: &mut RawConfig) -> Result<()> {
        if let Ok(program) = std::env::var("QUICKOPEN_SEARCH_PROGRAM") {
            if !program.is_empty() {
                config.picker.search_program = program;
            }
        }

        if let Ok(max) = std::env::var("QUICKOPEN_MAX_RESULTS") {
            config.picker.max_results_per_root = max
                .trim()
                .parse()
                .with_context(|| format!("QUICKOPEN_MAX_RESULTS is not a number: {}", max))?;
        }

        Ok(())
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<(RawConfig, PathBuf)> {
        if path.is_file() {
            Ok((self.load_file(path).await?, path.to_path_buf()))
        } else if path.is_dir() {
            // Try config.json in the directory
            let config_file = path.join("config.json");
            if config_file.exists() {
                Ok((self.load_file(&config_file).await?, config_file))
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find git repository root
    fn find_git_root(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(Path::to_path_buf)
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
            _ => dirs::config_dir(),
        }
    }

    /// Resolve raw config to ResolvedCliConfig
    fn resolve_config(&self, config: RawConfig, source: Option<PathBuf>) -> Result<ResolvedCliConfig> {
        let cwd = std::env::current_dir()?;

        // Flag roots replace configured ones
        let roots = if self.roots_override.is_empty() {
            config
                .roots
                .iter()
                .map(|root| PathBuf::from(shellexpand::tilde(root).into_owned()))
                .collect()
        } else {
            self.roots_override.clone()
        };

        // Roots must be absolute so results and create targets are too
        let roots = roots
            .into_iter()
            .map(|root| if root.is_absolute() { root } else { cwd.join(root) })
            .collect();

        config
            .picker
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(ResolvedCliConfig {
            picker: config.picker,
            roots,
            open_with: config.open_with.filter(|command| !command.trim().is_empty()),
            source,
        })
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
