use futures::Future;

pub(super) type QuitSignal = tokio::sync::oneshot::Receiver<Quit>;

#[derive(Debug, Clone, Copy)]
pub(super) struct Quit;

/// A spawned sampling loop, tagged with the generation it was started in.
#[derive(Debug)]
pub(super) struct SamplingTask {
    pub(super) generation: u64,
    tx: tokio::sync::oneshot::Sender<Quit>,
    handle: tokio::task::JoinHandle<()>,
}

impl SamplingTask {
    pub(super) fn spawn<F>(generation: u64, f: impl FnOnce(QuitSignal) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = tokio::task::spawn(f(rx));
        Self {
            generation,
            tx,
            handle,
        }
    }

    pub(super) fn quit(self) {
        let _ = self.tx.send(Quit);
    }

    pub(super) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
