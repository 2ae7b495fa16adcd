use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::data::loader::load_file;
use crate::data::model::{Chromatogram2D, RawSeries};
use crate::data::params::ProcessingParameters;
use crate::data::pipeline::process;

// ---------------------------------------------------------------------------
// Background jobs: loading and processing run off the UI thread
// ---------------------------------------------------------------------------

/// Results posted back by a background job.
#[derive(Debug)]
pub enum WorkerMessage {
    Loaded(PathBuf, Arc<RawSeries>),
    LoadFailed(String),
    Processed(Box<Chromatogram2D>),
    ProcessFailed(String),
}

pub struct Worker {
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
}

impl Default for Worker {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }
}

impl Worker {
    /// Load `path` in the background. `notify` runs once the result is queued
    /// (the app passes a repaint request).
    pub fn spawn_load(
        &self,
        path: PathBuf,
        has_headers: bool,
        notify: impl FnOnce() + Send + 'static,
    ) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let msg = match load_file(&path, has_headers) {
                Ok(raw) => {
                    log::info!("Loaded {} samples from {}", raw.len(), path.display());
                    WorkerMessage::Loaded(path, Arc::new(raw))
                }
                Err(e) => {
                    log::error!("Failed to load file: {e:#}");
                    WorkerMessage::LoadFailed(format!("{e:#}"))
                }
            };
            // The receiver only disappears when the app is shutting down.
            let _ = tx.send(msg);
            notify();
        });
    }

    /// Run the full processing pipeline in the background.
    pub fn spawn_process(
        &self,
        raw: Arc<RawSeries>,
        params: ProcessingParameters,
        notify: impl FnOnce() + Send + 'static,
    ) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let msg = match process(&raw, &params) {
                Ok(chrom) => WorkerMessage::Processed(Box::new(chrom)),
                Err(e) => {
                    log::error!("Processing failed: {e}");
                    WorkerMessage::ProcessFailed(e.to_string())
                }
            };
            let _ = tx.send(msg);
            notify();
        });
    }

    /// Drain every message that has arrived since the last frame.
    pub fn poll(&self) -> Vec<WorkerMessage> {
        self.rx.try_iter().collect()
    }
}
