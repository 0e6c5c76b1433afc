use std::path::{Path, PathBuf};

use futures::channel::oneshot;

use super::ExportRequest;
use crate::error::ExportError;

/// A finished export, successful or not.
#[derive(Debug)]
pub struct ExportOutcome {
    pub file_name: String,
    pub result: Result<PathBuf, ExportError>,
}

struct PendingExport {
    file_name: String,
    receiver: oneshot::Receiver<Result<PathBuf, ExportError>>,
}

/// Exports running off the UI thread. Poll once per frame.
#[derive(Default)]
pub struct ExportQueue {
    pending: Vec<PendingExport>,
}

impl std::fmt::Debug for ExportQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl ExportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, request: ExportRequest, output_dir: &Path) {
        let (sender, receiver) = oneshot::channel();
        let file_name = request.file_name.clone();
        let output_dir = output_dir.to_path_buf();
        let job = move || {
            let result = request.run().and_then(|file| file.save_to(&output_dir));
            // The receiver is gone if the app shut down; nothing left to report to.
            let _ = sender.send(result);
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(job);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move { job() });

        self.pending.push(PendingExport { file_name, receiver });
    }

    /// Collect every export that finished since the last poll.
    pub fn poll(&mut self) -> Vec<ExportOutcome> {
        let mut finished = Vec::new();
        self.pending.retain_mut(|job| match job.receiver.try_recv() {
            Ok(None) => true,
            Ok(Some(result)) => {
                finished.push(ExportOutcome {
                    file_name: job.file_name.clone(),
                    result,
                });
                false
            }
            Err(oneshot::Canceled) => {
                log::error!("Export worker for {} went away", job.file_name);
                finished.push(ExportOutcome {
                    file_name: job.file_name.clone(),
                    result: Err(ExportError::WorkerLost),
                });
                false
            }
        });
        finished
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
