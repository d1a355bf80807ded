//! Dedicated writer task for acknowledgement frames.
//!
//! Each connection owns one writer task that receives outbound frames via an
//! mpsc channel and writes them to the socket's write half. The reader loop
//! never waits on the socket: it hands a frame to the channel and moves on.
//!
//! # Architecture
//!
//! ```text
//! Reader loop ─► mpsc::Sender<Bytes> ─► Writer Task ─► Socket write half
//! ```
//!
//! Frames are written in the order they were queued. Frames that are ready
//! together are batched into one vectored write.

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ListenerError, Result};

/// Default channel capacity (queued, unwritten frames per connection).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Maximum frames to batch in a single write operation.
const MAX_BATCH_SIZE: usize = 16;

/// Handle for queueing frames on a connection's writer task.
#[derive(Clone)]
pub struct WriterHandle {
    /// Channel sender for frames.
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }

    /// Queue a frame without waiting.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::Backpressure`] if the queue is full.
    /// - [`ListenerError::ConnectionClosed`] if the writer task has stopped.
    pub fn try_send(&self, frame: Bytes) -> Result<()> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ListenerError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => ListenerError::ConnectionClosed,
        })
    }
}

/// Spawn the writer task and return a handle for queueing frames.
///
/// The task ends cleanly once every handle is dropped and the queue is
/// drained, or with an error when a write fails.
pub fn spawn_writer_task<W>(writer: W, capacity: usize) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = WriterHandle::new(tx);
    let task = tokio::spawn(writer_loop(rx, writer));

    (handle, task)
}

/// Main writer loop - receives frames and writes them to the socket.
async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(first) = rx.recv().await {
        let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
        batch.push(first);

        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(frame) => batch.push(frame),
                Err(_) => break,
            }
        }

        write_batch(&mut writer, &batch).await?;
    }

    // Channel closed, clean shutdown
    writer.shutdown().await.ok();
    Ok(())
}

/// Write a batch of frames with scatter/gather I/O, finishing partial writes.
async fn write_batch<W>(writer: &mut W, batch: &[Bytes]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total_size: usize = batch.iter().map(Bytes::len).sum();
    let mut total_written = 0;

    while total_written < total_size {
        let slices = build_remaining_slices(batch, total_written);
        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(ListenerError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build IoSlice array for remaining data after a partial write.
fn build_remaining_slices(batch: &[Bytes], skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batch.len());
    let mut offset = 0;

    for frame in batch {
        let end = offset + frame.len();
        if skip_bytes < end && !frame.is_empty() {
            let start_in_frame = skip_bytes.saturating_sub(offset);
            slices.push(IoSlice::new(&frame[start_in_frame..]));
        }
        offset = end;
    }

    slices
}
