use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::assemble::{self, AssembleOutcome};
use crate::cli::{AssembleArgs, BatchArgs};
use crate::model::{AssemblyLayout, AssemblyStrategy};

/// One line of a jobs file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchJob {
    pub bundle: String,
    pub out: String,
    #[serde(default)]
    pub strategy: Option<AssemblyStrategy>,
    #[serde(default)]
    pub layout: Option<AssemblyLayout>,
    #[serde(default)]
    pub assets_dir: Option<String>,
}

impl BatchJob {
    fn into_args(self, force: bool) -> AssembleArgs {
        AssembleArgs {
            bundle: self.bundle,
            out: self.out,
            strategy: self.strategy,
            layout: self.layout,
            assets_dir: self.assets_dir,
            force,
        }
    }
}

/// Blank lines and `#` comments are skipped.
pub fn parse_jobs(contents: &str) -> anyhow::Result<Vec<BatchJob>> {
    let mut jobs = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let job: BatchJob = serde_json::from_str(line)
            .with_context(|| format!("parse job on line {}", idx + 1))?;
        jobs.push(job);
    }
    Ok(jobs)
}

/// Bounded pool of blocking assembly workers. Each document is assembled on a
/// single worker; only whole documents run side by side.
#[derive(Debug, Clone)]
pub struct AssemblyPool {
    semaphore: Arc<Semaphore>,
}

impl AssemblyPool {
    pub fn new(max_concurrency: usize) -> Self {
        let permits = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub async fn assemble(&self, args: AssembleArgs) -> anyhow::Result<AssembleOutcome> {
        let _permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .context("assembly pool semaphore is closed")?;
        tokio::task::spawn_blocking(move || assemble::run(args))
            .await
            .context("join assembly worker")?
    }
}

pub async fn run(args: BatchArgs) -> anyhow::Result<Vec<AssembleOutcome>> {
    let jobs_path = PathBuf::from(&args.jobs);
    let contents = tokio::task::spawn_blocking({
        let jobs_path = jobs_path.clone();
        move || std::fs::read_to_string(jobs_path)
    })
    .await
    .context("join jobs reader")?
    .with_context(|| format!("read jobs: {}", jobs_path.display()))?;
    let jobs = parse_jobs(&contents)?;
    tracing::info!(
        jobs = jobs.len(),
        concurrency = args.concurrency,
        "start batch"
    );

    let pool = AssemblyPool::new(args.concurrency);
    let mut handles = Vec::with_capacity(jobs.len());
    for job in jobs {
        let pool = pool.clone();
        let bundle = job.bundle.clone();
        let job_args = job.into_args(args.force);
        handles.push((
            bundle,
            tokio::spawn(async move { pool.assemble(job_args).await }),
        ));
    }

    let mut outcomes = Vec::new();
    let mut failed = 0usize;
    for (bundle, handle) in handles {
        match handle.await.context("join batch job")? {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                failed += 1;
                tracing::error!(bundle = %bundle, error = %format!("{err:#}"), "job failed");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} batch jobs failed", failed + outcomes.len());
    }
    tracing::info!(documents = outcomes.len(), "batch done");
    Ok(outcomes)
}
