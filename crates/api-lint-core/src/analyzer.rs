//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::markers::MarkerRegistry;
use crate::model::{Package, Program, SourceFile};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A package dump is not valid JSON for the declaration model.
    #[error("Decode error in {path}: {message}")]
    Decode {
        /// Path to the file that failed to decode.
        path: PathBuf,
        /// Decode error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    registry: Option<MarkerRegistry>,
    fail_on_decode_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the marker registry (default: the one `[markers]` in the config
    /// describes).
    #[must_use]
    pub fn registry(mut self, registry: MarkerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets whether an undecodable package dump aborts the run (default: false).
    #[must_use]
    pub fn fail_on_decode_error(mut self, fail: bool) -> Self {
        self.fail_on_decode_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or a
    /// glob pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());

        let compile = |patterns: &[String]| -> Result<Vec<glob::Pattern>, AnalyzerError> {
            patterns
                .iter()
                .map(|p| glob::Pattern::new(p).map_err(AnalyzerError::from))
                .collect()
        };

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude: compile(&exclude_patterns)?,
            include: compile(&include_patterns)?,
            registry: self
                .registry
                .unwrap_or_else(|| config.markers.registry()),
            config,
            fail_on_decode_error: self.fail_on_decode_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    registry: MarkerRegistry,
    config: Config,
    fail_on_decode_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Discovers, decodes and analyzes all package dumps under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, a file cannot be read, or a dump
    /// cannot be decoded while `fail_on_decode_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} package dumps", files.len());

        let mut packages = Vec::with_capacity(files.len());
        for path in &files {
            match Self::load_package(path) {
                Ok(package) => packages.push(package),
                Err(AnalyzerError::Decode { path, message }) => {
                    warn!("Failed to decode {}: {}", path.display(), message);
                    if self.fail_on_decode_error {
                        return Err(AnalyzerError::Decode { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        self.analyze_program(&Program::new(packages))
    }

    /// Analyzes an in-memory program.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured worker pool cannot be created.
    pub fn analyze_program(&self, program: &Program) -> Result<LintResult, AnalyzerError> {
        let units: Vec<(&Package, &SourceFile)> = program
            .packages()
            .iter()
            .flat_map(|p| p.files.iter().map(move |f| (p, f)))
            .collect();

        let run = || -> Vec<Violation> {
            units
                .par_iter()
                .flat_map_iter(|(package, file)| self.analyze_file(program, package, file))
                .collect()
        };

        let violations = match self.config.analyzer.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run),
            None => run(),
        };

        let mut result = LintResult {
            violations,
            files_checked: units.len(),
        };
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every enabled rule on one source file.
    fn analyze_file(
        &self,
        program: &Program,
        package: &Package,
        file: &SourceFile,
    ) -> Vec<Violation> {
        debug!("Analyzing: {}", file.path.display());

        let ctx = FileContext::new(program, package, file, &self.registry);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = rule.check(&ctx);
            violations.extend(self.apply_severity_override(rule.name(), rule_violations));
        }

        violations
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    fn load_package(path: &Path) -> Result<Package, AnalyzerError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AnalyzerError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Discovers all `*.json` package dumps to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let respect = self.config.analyzer.respect_gitignore;
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(respect)
            .git_exclude(respect)
            .git_global(respect)
            .ignore(respect)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let matches = |patterns: &[glob::Pattern]| {
            patterns
                .iter()
                .any(|p| p.matches_path(path) || p.matches_path(relative))
        };

        if matches(&self.exclude) {
            return true;
        }
        !self.include.is_empty() && !matches(&self.include)
    }
}
