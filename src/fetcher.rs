//! Bounded parallel downloads with per-file caching and retry.
//!
//! A batch runs on a fixed pool of workers. Each worker claims the next task
//! index from a shared cursor, so no more than `max_parallel` requests are in
//! flight at once, and returns its outcomes when the queue is drained. One
//! failed file never stops the batch; it is reported in [`FetchReport`].

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tempfile::NamedTempFile;
use tokio::task::JoinSet;

use crate::{
    config::Config,
    error::{Error, HttpError, Result},
    http::{Agent, HttpClient},
    paths,
};

/// One file to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Source URL.
    pub url: String,
    /// Destination path; unique within a batch.
    pub destination: PathBuf,
    /// User-Agent to request with.
    pub agent: Agent,
}

impl DownloadTask {
    /// Create a task using the default User-Agent.
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            agent: Agent::Default,
        }
    }

    /// Request this file with the given User-Agent.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }
}

/// Batch tuning.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Pool size.
    pub max_parallel: usize,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Existing files younger than this are reused.
    pub cache_age: Duration,
    /// Ignore existing files and always download.
    pub bypass_cache: bool,
}

impl FetchOptions {
    /// Options taken from the config, honoring `bypass_cache`.
    pub fn from_config(config: &Config, bypass_cache: bool) -> Self {
        Self {
            max_parallel: config.max_workers,
            retries: config.retries,
            cache_age: config.font_cache_age,
            bypass_cache,
        }
    }
}

/// How a single task ended.
#[derive(Debug)]
pub enum TaskStatus {
    /// Downloaded and written.
    Succeeded,
    /// A fresh copy already existed.
    Cached,
    /// Every attempt failed.
    Failed(Error),
}

/// A task that exhausted its retry budget.
#[derive(Debug)]
pub struct FailedTask {
    /// The task itself, ready to be retried.
    pub task: DownloadTask,
    /// Last error observed.
    pub error: Error,
}

/// Aggregate result of a batch.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Files downloaded in this batch.
    pub succeeded: usize,
    /// Files reused from disk.
    pub cached: usize,
    /// Files that could not be downloaded, in input order.
    pub failed: Vec<FailedTask>,
}

impl FetchReport {
    /// Fold a retry pass into this report.
    ///
    /// Tasks that succeed on retry move from failed to succeeded.
    pub fn absorb_retry(&mut self, retry: Self) {
        self.succeeded += retry.succeeded;
        self.cached += retry.cached;
        self.failed = retry.failed;
    }

    /// Tasks that failed, without the error details.
    pub fn failed_tasks(&self) -> Vec<DownloadTask> {
        self.failed.iter().map(|failed| failed.task.clone()).collect()
    }
}

/// Progress notification for a single task.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// One-based position of the task in the input list.
    pub position: usize,
    /// Number of tasks in the batch.
    pub total: usize,
    /// The task being started.
    pub task: &'a DownloadTask,
}

/// Callback invoked when a worker starts a task.
pub type ProgressHook = Arc<dyn Fn(Progress<'_>) + Send + Sync>;

/// Runs download batches against an HTTP client.
#[derive(Clone)]
pub struct Fetcher {
    /// Client shared by all workers.
    client: Arc<dyn HttpClient>,
    /// Optional progress observer.
    progress: Option<ProgressHook>,
}

impl Fetcher {
    /// Create a fetcher without progress reporting.
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            progress: None,
        }
    }

    /// Report progress through `hook`.
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Download every task, at most `options.max_parallel` at a time.
    pub async fn fetch_all(
        &self,
        tasks: Vec<DownloadTask>,
        options: FetchOptions,
    ) -> Result<FetchReport> {
        let total = tasks.len();
        let tasks: Arc<[DownloadTask]> = tasks.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = options.max_parallel.max(1).min(total);

        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let worker = Worker {
                client: Arc::clone(&self.client),
                progress: self.progress.clone(),
                tasks: Arc::clone(&tasks),
                cursor: Arc::clone(&cursor),
                options,
            };
            pool.spawn(worker.run());
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = pool.join_next().await {
            let finished = joined.map_err(|error| Error::WorkerJoin {
                message: error.to_string(),
            })?;
            outcomes.extend(finished);
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = FetchReport::default();
        for (index, status) in outcomes {
            match status {
                TaskStatus::Succeeded => report.succeeded += 1,
                TaskStatus::Cached => report.cached += 1,
                TaskStatus::Failed(error) => report.failed.push(FailedTask {
                    task: tasks[index].clone(),
                    error,
                }),
            }
        }
        Ok(report)
    }
}

/// One pool worker and the state it shares with its siblings.
struct Worker {
    /// HTTP client.
    client: Arc<dyn HttpClient>,
    /// Progress observer.
    progress: Option<ProgressHook>,
    /// Full task list.
    tasks: Arc<[DownloadTask]>,
    /// Next unclaimed task index.
    cursor: Arc<AtomicUsize>,
    /// Batch options.
    options: FetchOptions,
}

impl Worker {
    /// Claim and process tasks until the list is exhausted.
    async fn run(self) -> Vec<(usize, TaskStatus)> {
        let mut outcomes = Vec::new();
        loop {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(task) = self.tasks.get(index) else {
                break;
            };

            if let Some(hook) = &self.progress {
                hook(Progress {
                    position: index + 1,
                    total: self.tasks.len(),
                    task,
                });
            }

            outcomes.push((index, self.process(task).await));
        }
        outcomes
    }

    /// Reuse, download, or give up on a single task.
    async fn process(&self, task: &DownloadTask) -> TaskStatus {
        if !self.options.bypass_cache && paths::is_fresh(&task.destination, self.options.cache_age)
        {
            return TaskStatus::Cached;
        }

        let attempts = self.options.retries + 1;
        let mut last_error = HttpError::Transport {
            message: "no attempt made".to_string(),
        };

        for _ in 0..attempts {
            match self.client.get(&task.url, task.agent).await {
                Ok(body) => {
                    return match write_atomic(&task.destination, &body) {
                        Ok(()) => TaskStatus::Succeeded,
                        Err(error) => TaskStatus::Failed(error),
                    };
                }
                Err(error) => last_error = error,
            }
        }

        TaskStatus::Failed(Error::FontFetch {
            url: task.url.clone(),
            attempts,
            source: last_error,
        })
    }
}

/// Write `contents` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|error| Error::FileWrite {
        path: parent.to_path_buf(),
        source: error,
    })?;

    let mut file = NamedTempFile::new_in(parent).map_err(|error| Error::FileWrite {
        path: path.to_path_buf(),
        source: error,
    })?;
    file.write_all(contents).map_err(|error| Error::FileWrite {
        path: path.to_path_buf(),
        source: error,
    })?;
    file.persist(path).map_err(|error| Error::FileWrite {
        path: path.to_path_buf(),
        source: error.error,
    })?;
    Ok(())
}
