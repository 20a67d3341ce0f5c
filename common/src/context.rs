use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A cancellation context handed to long running tasks.
///
/// Every clone keeps the context alive. The owning [`Handler`] can cancel
/// the context and then wait until every clone has been dropped, which is
/// how shutdown waits for in-flight work to finish.
#[derive(Clone, Debug)]
pub struct Context {
	token: CancellationToken,
	_alive: mpsc::Sender<()>,
}

#[derive(Debug)]
pub struct Handler {
	token: CancellationToken,
	alive: mpsc::Receiver<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let token = CancellationToken::new();
		let (alive_send, alive_recv) = mpsc::channel(1);

		(
			Self {
				token: token.clone(),
				_alive: alive_send,
			},
			Handler {
				token,
				alive: alive_recv,
			},
		)
	}

	pub async fn done(&self) {
		self.token.cancelled().await;
	}
}

impl Handler {
	/// Cancels the context and resolves once every clone of it is dropped.
	pub async fn cancel(mut self) {
		self.token.cancel();
		// recv only returns None once every sender (context) is gone
		while self.alive.recv().await.is_some() {}
	}
}
