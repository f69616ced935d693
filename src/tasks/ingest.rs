//! Serial ingestion: raw port bytes through the frame extractor into
//! the message queue.

use crate::protocol::framing::FrameExtractor;
use crate::queue::{try_enqueue, MessageSender};
use embedded_io_async::Read;
use log::warn;

/// Feed one chunk of port bytes through the extractor, enqueueing every
/// completed frame. Returns the number of frames enqueued (completed
/// frames dropped by a full queue are not counted).
pub fn ingest_chunk(
    extractor: &mut FrameExtractor,
    chunk: &[u8],
    sender: &MessageSender<'_>,
) -> usize {
    let mut enqueued = 0;
    for &byte in chunk {
        if let Some(message) = extractor.feed(byte) {
            if try_enqueue(sender, message) {
                enqueued += 1;
            }
        }
    }
    enqueued
}

/// Read from the serial port forever, extracting frames as bytes arrive.
///
/// A read error is logged and the port retried; framing-level recovery
/// (noise, overflow, malformed frames) lives in the extractor.
pub async fn ingest_task<R: Read>(mut port: R, sender: MessageSender<'_>) -> ! {
    let mut extractor = FrameExtractor::new();
    let mut buf = [0u8; 64];
    loop {
        match port.read(&mut buf).await {
            Ok(0) => continue,
            Ok(n) => {
                ingest_chunk(&mut extractor, &buf[..n], &sender);
            }
            Err(_) => warn!("serial read error, retrying"),
        }
    }
}
