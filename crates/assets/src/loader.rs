use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use joyrun_common::{CharacterVariant, ModelFormat};
use tracing::{debug, warn};

use crate::{AssetError, ModelData, ModelSource};

/// Requests resolved per drain by [`ImmediateLoader`].
pub const DEFAULT_LOAD_BUDGET: usize = 1;

/// Identifies one load request. Issued in increasing order by the requester,
/// which treats every token but its latest as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub variant: CharacterVariant,
    pub url: String,
    pub format: ModelFormat,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub variant: CharacterVariant,
    pub result: Result<ModelData, AssetError>,
}

/// A queue of model loads that settle when drained.
pub trait AssetLoader {
    fn submit(&mut self, request: LoadRequest);

    /// Completions ready since the last drain. Never blocks.
    fn drain_completed(&mut self) -> Vec<LoadCompletion>;

    /// Requests submitted but not yet drained.
    fn pending(&self) -> usize;
}

fn run(source: &dyn ModelSource, request: LoadRequest) -> LoadCompletion {
    let result = source.fetch(&request.url, request.format);
    match &result {
        Ok(model) => debug!(
            token = request.token.0,
            variant = %request.variant,
            content = %model.content_id(),
            triangles = model.triangle_count(),
            "Model loaded"
        ),
        Err(e) => warn!(token = request.token.0, url = %request.url, error = %e, "Model load failed"),
    }
    LoadCompletion {
        token: request.token,
        variant: request.variant,
        result,
    }
}

/// Resolves queued requests on the caller's thread, at most `budget` per drain.
/// Nothing resolves inside `submit`.
#[derive(Debug)]
pub struct ImmediateLoader<S> {
    source: S,
    queue: VecDeque<LoadRequest>,
    budget: usize,
}

impl<S: ModelSource> ImmediateLoader<S> {
    pub fn new(source: S) -> Self {
        Self::with_budget(source, DEFAULT_LOAD_BUDGET)
    }

    pub fn with_budget(source: S, budget: usize) -> Self {
        Self {
            source,
            queue: VecDeque::new(),
            budget: budget.max(1),
        }
    }
}

impl<S: ModelSource> AssetLoader for ImmediateLoader<S> {
    fn submit(&mut self, request: LoadRequest) {
        self.queue.push_back(request);
    }

    fn drain_completed(&mut self) -> Vec<LoadCompletion> {
        let n = self.budget.min(self.queue.len());
        let source = &self.source;
        self.queue.drain(..n).map(|req| run(source, req)).collect()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Runs one request on the worker. A panicking source becomes a failed
/// completion so the requester still hears back about the token.
fn run_guarded(source: &dyn ModelSource, request: LoadRequest) -> LoadCompletion {
    let (token, variant) = (request.token, request.variant);
    panic::catch_unwind(AssertUnwindSafe(|| run(source, request))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(token = token.0, %message, "Model load panicked");
        LoadCompletion {
            token,
            variant,
            result: Err(AssetError::LoadPanicked(message)),
        }
    })
}

/// Resolves requests on a background worker thread.
///
/// The worker owns the source and only ever sends completions back; the
/// owner picks them up with [`AssetLoader::drain_completed`]. Every submitted
/// token yields exactly one completion, including when the worker is gone.
pub struct ThreadedLoader {
    requests: Option<Sender<LoadRequest>>,
    completions: Receiver<LoadCompletion>,
    worker: Option<JoinHandle<()>>,
    outstanding: BTreeMap<LoadToken, CharacterVariant>,
    failed: Vec<LoadCompletion>,
}

impl ThreadedLoader {
    pub fn spawn<S: ModelSource + 'static>(source: S) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<LoadRequest>();
        let (done_tx, done_rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("joyrun-asset-loader".into())
            .spawn(move || {
                for request in req_rx {
                    if done_tx.send(run_guarded(&source, request)).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            requests: Some(req_tx),
            completions: done_rx,
            worker: Some(worker),
            outstanding: BTreeMap::new(),
            failed: Vec::new(),
        })
    }

    fn disconnected(token: LoadToken, variant: CharacterVariant) -> LoadCompletion {
        LoadCompletion {
            token,
            variant,
            result: Err(AssetError::LoaderDisconnected),
        }
    }
}

impl std::fmt::Debug for ThreadedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedLoader")
            .field("outstanding", &self.outstanding.len())
            .finish_non_exhaustive()
    }
}

impl AssetLoader for ThreadedLoader {
    fn submit(&mut self, request: LoadRequest) {
        let (token, variant) = (request.token, request.variant);
        let sent = match &self.requests {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        };
        if sent {
            self.outstanding.insert(token, variant);
        } else {
            warn!(token = token.0, "Asset loader worker is gone");
            self.failed.push(Self::disconnected(token, variant));
        }
    }

    fn drain_completed(&mut self) -> Vec<LoadCompletion> {
        let mut out = std::mem::take(&mut self.failed);
        loop {
            match self.completions.try_recv() {
                Ok(completion) => {
                    self.outstanding.remove(&completion.token);
                    out.push(completion);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Nothing outstanding will arrive; fail each token instead.
                    if !self.outstanding.is_empty() {
                        warn!(lost = self.outstanding.len(), "Asset loader worker exited");
                    }
                    out.extend(
                        std::mem::take(&mut self.outstanding)
                            .into_iter()
                            .map(|(token, variant)| Self::disconnected(token, variant)),
                    );
                    self.requests = None;
                    break;
                }
            }
        }
        out
    }

    fn pending(&self) -> usize {
        self.outstanding.len() + self.failed.len()
    }
}

impl Drop for ThreadedLoader {
    fn drop(&mut self) {
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
