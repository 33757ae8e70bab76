//! Hand-off from background threads (file dialogs) to the editor's logic thread.
//!
//! Producers hold a [`TaskSender`] and push closures; the logic thread drains the
//! queue once per frame with [`TaskQueue::poll`], so every task runs with exclusive
//! access to the [`EditorSession`].

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::editor::EditorSession;

/// Work to run on the logic thread.
pub type Task = Box<dyn FnOnce(&mut EditorSession) + Send + 'static>;

/// Cloneable producer side of a [`TaskQueue`].
#[derive(Clone)]
pub struct TaskSender {
    tx: Sender<Task>,
}

impl TaskSender {
    /// Queue `task`. Returns `false` if the queue was dropped.
    pub fn enqueue<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut EditorSession) + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Consumer side, owned by the logic thread.
pub struct TaskQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    /// Empty queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A producer handle that can move to another thread.
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            tx: self.tx.clone(),
        }
    }

    /// Queue `task` from the logic thread itself.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce(&mut EditorSession) + Send + 'static,
    {
        // rx lives in self, so the channel cannot be disconnected here
        let _ = self.tx.send(Box::new(task));
    }

    /// True when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Run the tasks queued when the call starts, in FIFO order. Returns how many ran.
    ///
    /// Tasks queued while polling wait for the next call.
    pub fn poll(&self, session: &mut EditorSession) -> usize {
        let pending = self.rx.len();
        let mut ran = 0;
        while ran < pending {
            let Ok(task) = self.rx.try_recv() else {
                break;
            };
            task(session);
            ran += 1;
        }
        ran
    }
}
