//! Background worker that runs projections off the calling thread.
//!
//! The worker owns one thread and processes one job at a time. Input
//! buffers are moved into the job, and results come back as messages on a
//! per-job channel, so no mutable state is shared with the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{ProjectionError, Result};
use crate::generator::{generate_with, CancelToken, ProjectionOutput};
use crate::mesh::TriangleSoup;
use crate::options::ProjectionOptions;

/// Minimum spacing between progress messages.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(10);

/// A projection job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Optional triangle indices.
    pub index: Option<Vec<u32>>,
    /// Vertex positions.
    pub position: Vec<f32>,
    /// Projection options.
    pub options: ProjectionOptions,
}

impl JobRequest {
    /// Job for `mesh` with `options`.
    pub fn new(mesh: TriangleSoup, options: ProjectionOptions) -> Self {
        Self {
            index: mesh.indices,
            position: mesh.positions,
            options,
        }
    }
}

/// Message from the worker about a job.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Overall completion in `[0, 1]`.
    Progress(f64),
    /// The job finished.
    Result(ProjectionOutput),
    /// The job failed or was cancelled.
    Error(ProjectionError),
}

impl WorkerMessage {
    /// Whether this is the last message for its job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress(_))
    }
}

struct Job {
    request: JobRequest,
    cancel: CancelToken,
    reply: Sender<WorkerMessage>,
    running: Arc<AtomicBool>,
}

/// Clears the in-flight flag when dropped, including during a panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    receiver: Receiver<WorkerMessage>,
    cancel: CancelToken,
    done: bool,
}

impl JobHandle {
    /// Next message, if one is ready.
    pub fn poll(&mut self) -> Result<Option<WorkerMessage>> {
        if self.done {
            return Ok(None);
        }
        match self.receiver.try_recv() {
            Ok(message) => {
                self.done = message.is_terminal();
                Ok(Some(message))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Err(crashed())
            }
        }
    }

    /// Block until the job finishes, forwarding progress to `on_progress`.
    pub fn wait<F>(self, mut on_progress: F) -> Result<ProjectionOutput>
    where
        F: FnMut(f64),
    {
        if self.done {
            return Err(ProjectionError::TaskFinished);
        }
        loop {
            match self.receiver.recv() {
                Ok(WorkerMessage::Progress(p)) => on_progress(p),
                Ok(WorkerMessage::Result(output)) => return Ok(output),
                Ok(WorkerMessage::Error(err)) => return Err(err),
                Err(_) => return Err(crashed()),
            }
        }
    }

    /// Ask the worker to abort this job. The job ends with
    /// [`ProjectionError::Aborted`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

fn crashed() -> ProjectionError {
    ProjectionError::WorkerCrashed("worker exited without a result".into())
}

/// A background thread that runs one projection at a time.
#[derive(Debug)]
pub struct ProjectionWorker {
    jobs: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    active: Option<CancelToken>,
}

impl ProjectionWorker {
    /// Start the worker thread.
    pub fn spawn() -> Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name("edgeproj-worker".into())
            .spawn(move || worker_loop(queue))
            .map_err(|e| ProjectionError::WorkerUnavailable(e.to_string()))?;

        Ok(Self {
            jobs: Some(jobs),
            thread: Some(thread),
            running: Arc::new(AtomicBool::new(false)),
            active: None,
        })
    }

    /// Whether a job is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start a job. Only one job may run at a time.
    pub fn submit(&mut self, request: JobRequest) -> Result<JobHandle> {
        let Some(jobs) = &self.jobs else {
            return Err(ProjectionError::WorkerDisposed);
        };
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(ProjectionError::JobInProgress);
        }

        let (reply, receiver) = mpsc::channel();
        let cancel = CancelToken::new();
        let job = Job {
            request,
            cancel: cancel.clone(),
            reply,
            running: Arc::clone(&self.running),
        };
        if jobs.send(job).is_err() {
            self.running.store(false, Ordering::Release);
            return Err(ProjectionError::WorkerCrashed(
                "worker thread has exited".into(),
            ));
        }

        self.active = Some(cancel.clone());
        Ok(JobHandle {
            receiver,
            cancel,
            done: false,
        })
    }

    /// Cancel any running job, stop the thread, and wait for it to exit.
    pub fn dispose(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
        self.jobs = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("projection worker thread panicked");
            }
        }
    }

    /// Whether [`ProjectionWorker::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.jobs.is_none()
    }
}

impl Drop for ProjectionWorker {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn worker_loop(queue: Receiver<Job>) {
    debug!("projection worker started");
    while let Ok(job) = queue.recv() {
        run_job(job);
    }
    debug!("projection worker stopped");
}

fn run_job(job: Job) {
    let Job {
        request,
        cancel,
        reply,
        running,
    } = job;
    let guard = RunningGuard(running);

    let mesh = TriangleSoup {
        positions: request.position,
        indices: request.index,
    };
    let mut last_report = Instant::now();
    let result = generate_with(&[mesh], &request.options, &cancel, |progress, _| {
        if last_report.elapsed() >= PROGRESS_INTERVAL {
            // The handle may already be gone; the job still runs to the end.
            let _ = reply.send(WorkerMessage::Progress(progress.fraction));
            last_report = Instant::now();
        }
    });

    // Free the worker before the caller can see the terminal message.
    drop(guard);

    let terminal = match result {
        Ok(output) => {
            let _ = reply.send(WorkerMessage::Progress(1.0));
            WorkerMessage::Result(output)
        }
        Err(err) => {
            debug!(error = %err, "projection job failed");
            WorkerMessage::Error(err)
        }
    };
    if reply.send(terminal).is_err() {
        debug!("job handle dropped before the result arrived");
    }
}
