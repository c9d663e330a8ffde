//! Sequential runner loop over the selected test files

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use webtest_common::WebtestConfig;

use crate::database::Fixture;
use crate::error::E2eResult;
use crate::launcher::Launcher;
use crate::screenshots::clear_failure_screenshots;

/// Result of running a single test file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub name: String,
    pub path: PathBuf,
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl FileResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One pass over the selected files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: u32,
    pub results: Vec<FileResult>,
}

impl TrialResult {
    /// Exit code of the failing file, or 0
    pub fn exit_code(&self) -> i32 {
        self.results
            .iter()
            .find(|r| !r.success())
            .map(|r| r.exit_code)
            .unwrap_or(0)
    }
}

/// Result of the whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteOutcome {
    pub started_at: String,
    pub trials: Vec<TrialResult>,
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl SuiteOutcome {
    pub fn passed(&self) -> usize {
        self.all_results().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.all_results().filter(|r| !r.success()).count()
    }

    pub fn first_failure(&self) -> Option<&FileResult> {
        self.all_results().find(|r| !r.success())
    }

    pub fn all_results(&self) -> impl Iterator<Item = &FileResult> {
        self.trials.iter().flat_map(|t| t.results.iter())
    }
}

/// Waits until the user is done inspecting a finished loop
#[async_trait]
pub trait Pause: Send {
    async fn pause(&mut self, message: &str) -> std::io::Result<()>;
}

/// Waits for Enter on stdin; a no-op when stdin is not a terminal
#[derive(Debug, Default)]
pub struct StdinPause;

#[async_trait]
impl Pause for StdinPause {
    async fn pause(&mut self, message: &str) -> std::io::Result<()> {
        if !std::io::stdin().is_terminal() {
            return Ok(());
        }
        print!("{} Press Enter to stop the test server. ", message);
        std::io::stdout().flush()?;

        // Blocking read off the runtime so a shutdown signal can still win
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(std::io::Error::other)?
    }
}

/// How the loop runs
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// `Some(n)` runs up to n trials and pauses at the end
    pub loop_count: Option<u32>,

    pub screenshot_dir: PathBuf,

    pub screenshot_prefix: String,
}

impl RunOptions {
    pub fn from_config(config: &WebtestConfig, loop_count: Option<u32>) -> Self {
        Self {
            loop_count,
            screenshot_dir: config.paths.screenshot_dir.clone(),
            screenshot_prefix: config.paths.screenshot_prefix.clone(),
        }
    }
}

/// Drives the launcher over the files, one at a time
pub struct TestRunner<L, P> {
    launcher: L,
    pause: P,
    options: RunOptions,
}

impl<L: Launcher, P: Pause> TestRunner<L, P> {
    pub fn new(launcher: L, pause: P, options: RunOptions) -> Self {
        Self {
            launcher,
            pause,
            options,
        }
    }

    pub fn into_parts(self) -> (L, P) {
        (self.launcher, self.pause)
    }

    /// Run all trials; stops at the first failing file
    pub async fn run(
        &mut self,
        files: &[PathBuf],
        fixture: Option<&dyn Fixture>,
    ) -> E2eResult<SuiteOutcome> {
        let start = Instant::now();
        let mut outcome = SuiteOutcome {
            started_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        };

        if files.is_empty() {
            warn!("No test files selected");
        }

        let trials = self.options.loop_count.unwrap_or(1);
        info!("Running {} test file(s)...", files.len());

        for trial in 1..=trials {
            if self.options.loop_count.is_some() {
                info!("Running trial #{}", trial);
            }

            let removed = clear_failure_screenshots(
                &self.options.screenshot_dir,
                &self.options.screenshot_prefix,
            )?;
            if removed > 0 {
                info!("Removed {} stale failure screenshot(s)", removed);
            }

            let result = self.run_trial(trial, files, fixture).await?;
            let code = result.exit_code();
            outcome.trials.push(result);

            if code != 0 {
                outcome.exit_code = code;
                if self.options.loop_count.is_some() {
                    error!("Trial #{} failed", trial);
                }
                break;
            }
        }

        outcome.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            outcome.passed(),
            outcome.failed(),
            outcome.duration_ms
        );

        if self.options.loop_count.is_some() {
            let message = if outcome.exit_code == 0 {
                format!("All {} trial(s) passed.", outcome.trials.len())
            } else {
                format!("Trial #{} failed.", outcome.trials.len())
            };
            self.pause.pause(&message).await?;
        }

        Ok(outcome)
    }

    async fn run_trial(
        &self,
        trial: u32,
        files: &[PathBuf],
        fixture: Option<&dyn Fixture>,
    ) -> E2eResult<TrialResult> {
        let mut results = Vec::with_capacity(files.len());

        for file in files {
            let start = Instant::now();
            let exit_code = self.launcher.run_file(file).await?;
            let result = FileResult {
                name: display_name(file),
                path: file.clone(),
                exit_code,
                duration_ms: start.elapsed().as_millis() as u64,
            };

            if result.success() {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!("✗ {} exited with {}", result.name, exit_code);
            }
            results.push(result);

            if exit_code != 0 {
                break; // Stop on first failure
            }
            if let Some(fixture) = fixture {
                fixture.reset().await?;
            }
        }

        Ok(TrialResult { trial, results })
    }
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Create the directories the run writes into
pub fn prepare_output_dirs(config: &WebtestConfig, xunit_export: bool) -> E2eResult<()> {
    std::fs::create_dir_all(&config.paths.output_dir)?;
    if xunit_export {
        std::fs::create_dir_all(&config.paths.xunit_dir)?;
    }
    Ok(())
}

/// Write the run summary to a JSON file
pub fn write_results(outcome: &SuiteOutcome, path: &Path) -> E2eResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json)?;

    info!("Results written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_result(name: &str, exit_code: i32) -> FileResult {
        FileResult {
            name: name.to_string(),
            path: PathBuf::from(name),
            exit_code,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_trial_exit_code_is_first_failure() {
        let trial = TrialResult {
            trial: 1,
            results: vec![file_result("a", 0), file_result("b", 2), file_result("c", 5)],
        };
        assert_eq!(trial.exit_code(), 2);
    }

    #[test]
    fn test_outcome_counts() {
        let outcome = SuiteOutcome {
            trials: vec![
                TrialResult {
                    trial: 1,
                    results: vec![file_result("a", 0), file_result("b", 0)],
                },
                TrialResult {
                    trial: 2,
                    results: vec![file_result("a", 0), file_result("b", 1)],
                },
            ],
            exit_code: 1,
            ..Default::default()
        };
        assert_eq!(outcome.passed(), 3);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.first_failure().map(|r| r.name.as_str()), Some("b"));
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out/test-results.json");
        let outcome = SuiteOutcome {
            trials: vec![TrialResult {
                trial: 1,
                results: vec![file_result("00-realm.js", 0)],
            }],
            ..Default::default()
        };

        write_results(&outcome, &path).unwrap();
        let loaded: SuiteOutcome =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.trials[0].results[0].name, "00-realm.js");
    }
}
