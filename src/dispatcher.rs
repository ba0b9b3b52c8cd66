use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::{LayoutError, Result};
use crate::view::View;

pub type Callback = Box<dyn FnOnce(&mut View) + Send>;

/// Receiving side owned by a [`View`]; callbacks posted from any thread run
/// on the view's thread at the start of the next digest.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    sender: Sender<Callback>,
    receiver: Receiver<Callback>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            sender: self.sender.clone(),
        }
    }

    /// Takes every callback queued so far. Callbacks posted by the drained
    /// callbacks themselves wait for the next digest.
    pub fn drain(&self) -> Vec<Callback> {
        let mut pending = Vec::with_capacity(self.receiver.len());
        for _ in 0..self.receiver.len() {
            match self.receiver.try_recv() {
                Ok(callback) => pending.push(callback),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        pending
    }
}

#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    sender: Sender<Callback>,
}

impl DispatcherHandle {
    pub fn post(&self, callback: impl FnOnce(&mut View) + Send + 'static) -> Result<()> {
        self.sender
            .send(Box::new(callback))
            .map_err(|_| LayoutError::DispatcherClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_takes_only_already_queued_callbacks() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        handle.post(|_| {}).unwrap();
        handle.post(|_| {}).unwrap();
        assert_eq!(dispatcher.drain().len(), 2);
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn posting_after_drop_fails() {
        let handle = Dispatcher::new().handle();
        assert_eq!(handle.post(|_| {}), Err(LayoutError::DispatcherClosed));
    }
}
