//! A backend that runs on its own thread.
//!
//! Every call is shipped to the worker as a job and the caller blocks on a
//! per-call reply channel, so the worker sees calls in exactly the order they
//! were made and at most one is in flight.
//!
//! ```text
//! Caller                         Worker thread
//!   |--job [jobs: bounded(1)]------>| job(&mut backend)
//!   |<--result [reply: bounded(1)]--|
//! ```

use std::{
    io,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Sender, bounded};

use crate::backend::{CodeResult, Heat2dBackend, code};

type Job<B> = Box<dyn FnOnce(&mut B) + Send>;

/// Proxies [`Heat2dBackend`] calls to a backend owned by a worker thread.
///
/// If the worker exits, for example because the backend panicked, every
/// later call fails with [`code::WORKER_DISCONNECTED`]. Dropping the proxy
/// closes the job channel and joins the worker.
pub struct WorkerBackend<B> {
    jobs: Option<Sender<Job<B>>>,
    thread: Option<JoinHandle<()>>,
}

impl<B> std::fmt::Debug for WorkerBackend<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerBackend")
            .field("connected", &self.jobs.is_some())
            .finish_non_exhaustive()
    }
}

impl<B> WorkerBackend<B>
where
    B: Heat2dBackend + Send + 'static,
{
    /// Moves `backend` onto a new worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(mut backend: B) -> io::Result<Self> {
        let (jobs, inbox) = bounded::<Job<B>>(1);

        let thread = thread::Builder::new()
            .name("braid-heat-worker".into())
            .spawn(move || {
                for job in inbox {
                    job(&mut backend);
                }
                tracing::debug!("heat worker exiting");
            })?;

        Ok(Self {
            jobs: Some(jobs),
            thread: Some(thread),
        })
    }

    fn call<T, F>(&self, operation: &'static str, f: F) -> CodeResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut B) -> CodeResult<T> + Send + 'static,
    {
        let jobs = self.jobs.as_ref().ok_or(code::WORKER_DISCONNECTED)?;
        let (reply, response) = bounded(1);

        let job: Job<B> = Box::new(move |backend| {
            // The caller may have gone away; nothing to report to.
            let _ = reply.send(f(backend));
        });

        if jobs.send(job).is_err() {
            tracing::warn!(operation, "heat worker is gone");
            return Err(code::WORKER_DISCONNECTED);
        }
        response.recv().map_err(|_| {
            tracing::warn!(operation, "heat worker dropped the reply");
            code::WORKER_DISCONNECTED
        })?
    }
}

impl<B> Drop for WorkerBackend<B> {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("heat worker panicked");
            }
        }
    }
}

impl<B> Heat2dBackend for WorkerBackend<B>
where
    B: Heat2dBackend + Send + 'static,
{
    fn initialize_code(&mut self) -> CodeResult<()> {
        self.call("initialize_code", B::initialize_code)
    }

    fn commit_parameters(&mut self) -> CodeResult<()> {
        self.call("commit_parameters", B::commit_parameters)
    }

    fn cleanup_code(&mut self) -> CodeResult<()> {
        self.call("cleanup_code", B::cleanup_code)
    }

    fn evolve_model(&mut self, tend: f64) -> CodeResult<()> {
        self.call("evolve_model", move |b| b.evolve_model(tend))
    }

    fn get_model_time(&self) -> CodeResult<f64> {
        self.call("get_model_time", |b| b.get_model_time())
    }

    fn get_alpha(&self) -> CodeResult<f64> {
        self.call("get_alpha", |b| b.get_alpha())
    }

    fn set_alpha(&mut self, alpha: f64) -> CodeResult<()> {
        self.call("set_alpha", move |b| b.set_alpha(alpha))
    }

    fn get_time_step(&self) -> CodeResult<f64> {
        self.call("get_time_step", |b| b.get_time_step())
    }

    fn set_time_step(&mut self, timestep: f64) -> CodeResult<()> {
        self.call("set_time_step", move |b| b.set_time_step(timestep))
    }

    fn get_grid_cellsize(&self) -> CodeResult<f64> {
        self.call("get_grid_cellsize", |b| b.get_grid_cellsize())
    }

    fn set_grid_cellsize(&mut self, cellsize: f64) -> CodeResult<()> {
        self.call("set_grid_cellsize", move |b| b.set_grid_cellsize(cellsize))
    }

    fn get_nx(&self) -> CodeResult<usize> {
        self.call("get_nx", |b| b.get_nx())
    }

    fn set_nx(&mut self, nx: usize) -> CodeResult<()> {
        self.call("set_nx", move |b| b.set_nx(nx))
    }

    fn get_ny(&self) -> CodeResult<usize> {
        self.call("get_ny", |b| b.get_ny())
    }

    fn set_ny(&mut self, ny: usize) -> CodeResult<()> {
        self.call("set_ny", move |b| b.set_ny(ny))
    }

    fn get_temperature(&self, indices: &[(usize, usize)]) -> CodeResult<Vec<f64>> {
        let indices = indices.to_vec();
        let expected = indices.len();
        let values = self.call("get_temperature", move |b| b.get_temperature(&indices))?;
        if values.len() == expected {
            Ok(values)
        } else {
            Err(code::MALFORMED_REPLY)
        }
    }

    fn set_temperature(&mut self, indices: &[(usize, usize)], values: &[f64]) -> CodeResult<()> {
        let indices = indices.to_vec();
        let values = values.to_vec();
        self.call("set_temperature", move |b| {
            b.set_temperature(&indices, &values)
        })
    }
}
