// src/camera.rs - camera contract and the background capture worker
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::CameraConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    #[error("no camera frame received yet")]
    NoFrameAvailable,
    #[error("camera connection failed: {0}")]
    Connection(String),
    #[error("camera stream closed")]
    StreamClosed,
}

/// One decoded frame and the time it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bytes: Bytes,
    pub captured_at: DateTime<Utc>,
}

/// Transport seam for [`CameraClient`]: produces raw frames from whatever
/// stream the printer exposes. Concrete protocol drivers implement this;
/// tests use an in-memory source.
#[async_trait]
pub trait FrameSource: Send + 'static {
    async fn connect(&mut self, config: &CameraConfig) -> Result<(), CameraError>;

    /// Next frame from the stream. An error ends the capture loop.
    async fn next_frame(&mut self) -> Result<Bytes, CameraError>;

    async fn close(&mut self);
}

/// Contract for a printer camera connection.
///
/// Lifecycle is NotStarted -> Running -> Stopped, re-startable. The last
/// frame is a single-slot cache: one writer (the capture worker), any number
/// of readers, most recent write wins.
#[async_trait]
pub trait PrinterCamera {
    /// Start the capture worker. Returns `false` without side effects when
    /// the worker is already running.
    async fn start(&mut self) -> bool;

    /// Stop the capture worker. Returns only once the worker has fully
    /// terminated; calling it again while stopped is a no-op.
    async fn stop(&mut self);

    /// Whether the capture worker is currently executing.
    fn is_alive(&self) -> bool;

    /// Most recent frame, or `None` before the first frame arrives.
    fn last_frame(&self) -> Option<Frame>;

    /// Most recent frame, Base64-encoded.
    fn frame_base64(&self) -> Result<String, CameraError>;
}

/// Capture worker over a [`FrameSource`].
///
/// Owns the background task that connects the source and overwrites the
/// frame slot as frames arrive. Readers never block the writer: the slot is
/// a watch channel.
pub struct CameraClient<S> {
    config: CameraConfig,
    source: Arc<Mutex<S>>,
    frame_tx: watch::Sender<Option<Frame>>,
    frame_rx: watch::Receiver<Option<Frame>>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl<S: FrameSource> CameraClient<S> {
    pub fn new(config: CameraConfig, source: S) -> Self {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            source: Arc::new(Mutex::new(source)),
            frame_tx,
            frame_rx,
            shutdown_tx,
            worker: None,
        }
    }

    /// Watch the frame slot directly, e.g. to await the next frame instead
    /// of polling `last_frame`.
    pub fn subscribe(&self) -> watch::Receiver<Option<Frame>> {
        self.frame_rx.clone()
    }

    async fn run(
        source: Arc<Mutex<S>>,
        config: CameraConfig,
        frame_tx: watch::Sender<Option<Frame>>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        // stop() joins this task, so the source lock is free again before
        // the next start() can observe the worker as gone.
        let mut source = source.lock().await;
        if let Err(e) = source.connect(&config).await {
            tracing::error!("Camera connect to {}:{} failed: {}", config.hostname, config.port, e);
            return;
        }
        tracing::info!("Camera capture started on {}:{}", config.hostname, config.port);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    break;
                }
                frame = source.next_frame() => match frame {
                    Ok(bytes) => {
                        let _ = frame_tx.send(Some(Frame {
                            bytes,
                            captured_at: Utc::now(),
                        }));
                    }
                    Err(e) => {
                        // Reconnect policy belongs to the driver, not here.
                        tracing::warn!("Camera stream ended: {}", e);
                        break;
                    }
                }
            }
        }
        source.close().await;
        tracing::info!("Camera capture stopped");
    }
}

#[async_trait]
impl<S: FrameSource> PrinterCamera for CameraClient<S> {
    async fn start(&mut self) -> bool {
        if self.is_alive() {
            return false;
        }
        let shutdown_rx = self.shutdown_tx.subscribe();
        self.worker = Some(tokio::spawn(Self::run(
            self.source.clone(),
            self.config.clone(),
            self.frame_tx.clone(),
            shutdown_rx,
        )));
        true
    }

    async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.shutdown_tx.send(());
        if let Err(e) = worker.await {
            tracing::warn!("Camera worker did not shut down cleanly: {}", e);
        }
    }

    fn is_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    fn last_frame(&self) -> Option<Frame> {
        self.frame_rx.borrow().clone()
    }

    fn frame_base64(&self) -> Result<String, CameraError> {
        let frame = self.last_frame().ok_or(CameraError::NoFrameAvailable)?;
        Ok(BASE64.encode(&frame.bytes))
    }
}
