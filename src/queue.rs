//! Bounded message queue between serial ingestion and the control loop
//!
//! Single producer (the ingestion task) and single consumer (the
//! application loop). Enqueue never blocks: when every slot is taken the
//! message is dropped and its buffer freed by the producer. Ownership of
//! a message's buffer moves into the queue on enqueue and out on
//! dequeue, so each buffer is released exactly once on every path.

use crate::config::framing::MAX_MESSAGE_SIZE;
use crate::config::queue::MESSAGE_QUEUE_DEPTH;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};
use heapless::Vec;
use log::warn;

/// Heap-free owned payload buffer extracted from one serial frame.
pub type Message = Vec<u8, MAX_MESSAGE_SIZE>;

/// The bounded channel carrying message ownership.
pub type MessageQueue = Channel<CriticalSectionRawMutex, Message, MESSAGE_QUEUE_DEPTH>;

/// Producer handle for the ingestion context.
pub type MessageSender<'a> = Sender<'a, CriticalSectionRawMutex, Message, MESSAGE_QUEUE_DEPTH>;

/// Consumer handle for the application loop.
pub type MessageReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, Message, MESSAGE_QUEUE_DEPTH>;

/// Enqueue a message without blocking.
///
/// Returns `true` on success. On a full queue the message is dropped
/// here and `false` returned; this is backpressure, not a fault.
pub fn try_enqueue(sender: &MessageSender<'_>, message: Message) -> bool {
    match sender.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(dropped)) => {
            warn!("message queue full, dropping {} byte frame", dropped.len());
            false
        }
    }
}
