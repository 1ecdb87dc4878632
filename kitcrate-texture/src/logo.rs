//! Logo image loading, synchronous and on a background thread

use std::path::Path;
use std::sync::Arc;
use std::thread;

use image::RgbaImage;
use kitcrate_core::{Error, Result};
use tracing::{debug, warn};

/// Decode the image at `path` into RGBA8
pub fn load_logo<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    debug!("Loaded logo {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Outcome of polling a [`PendingLogo`]
#[derive(Debug, Clone)]
pub enum LogoPoll {
    Pending,
    Ready(Arc<RgbaImage>),
    Failed,
}

/// A logo decoding on a worker thread, polled from the owning thread
pub struct PendingLogo {
    source: String,
    receiver: flume::Receiver<Result<RgbaImage>>,
    resolved: Option<LogoPoll>,
}

impl PendingLogo {
    pub fn spawn(source: impl Into<String>) -> Self {
        let source = source.into();
        let (sender, receiver) = flume::bounded(1);

        let path = source.clone();
        let spawned = thread::Builder::new()
            .name("logo-loader".into())
            .spawn(move || {
                // The receiver may already be gone if the logo was replaced.
                let _ = sender.send(load_logo(&path));
            });

        let resolved = match spawned {
            Ok(_) => None,
            Err(e) => {
                warn!("Could not start logo loader for {}: {}", source, e);
                Some(LogoPoll::Failed)
            }
        };

        Self {
            source,
            receiver,
            resolved,
        }
    }

    /// Path or URL this logo was requested from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check for a result without blocking; a settled result is returned on every later call
    pub fn poll(&mut self) -> LogoPoll {
        if let Some(resolved) = &self.resolved {
            return resolved.clone();
        }

        let outcome = match self.receiver.try_recv() {
            Err(flume::TryRecvError::Empty) => return LogoPoll::Pending,
            Ok(Ok(image)) => LogoPoll::Ready(Arc::new(image)),
            Ok(Err(e)) => {
                warn!("Failed to load logo {}: {}", self.source, e);
                LogoPoll::Failed
            }
            Err(flume::TryRecvError::Disconnected) => {
                warn!("Logo loader for {} exited without a result", self.source);
                LogoPoll::Failed
            }
        };
        self.resolved = Some(outcome.clone());
        outcome
    }

    /// Block until the loader finishes
    pub fn wait(mut self) -> Result<Arc<RgbaImage>> {
        if self.resolved.is_none() {
            let outcome = match self.receiver.recv() {
                Ok(Ok(image)) => LogoPoll::Ready(Arc::new(image)),
                Ok(Err(e)) => return Err(e),
                Err(_) => LogoPoll::Failed,
            };
            self.resolved = Some(outcome);
        }
        match self.resolved {
            Some(LogoPoll::Ready(image)) => Ok(image),
            _ => Err(Error::Image(format!("logo {} could not be loaded", self.source))),
        }
    }
}

impl std::fmt::Debug for PendingLogo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogo")
            .field("source", &self.source)
            .field("resolved", &self.resolved.is_some())
            .finish()
    }
}
