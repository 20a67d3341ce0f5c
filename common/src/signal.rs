use futures::FutureExt;
use tokio::signal::unix::{Signal, SignalKind};

/// Multiplexes several unix signals into a single `recv`.
#[derive(Default)]
pub struct SignalHandler {
	signals: Vec<(SignalKind, Signal)>,
}

impl SignalHandler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_signal(mut self, kind: SignalKind) -> Self {
		if self.signals.iter().any(|(k, _)| k == &kind) {
			return self;
		}

		let signal = tokio::signal::unix::signal(kind).expect("failed to create signal");

		self.signals.push((kind, signal));

		self
	}

	/// Waits for any of the registered signals.
	/// Returns `None` straight away if nothing was registered.
	pub async fn recv(&mut self) -> Option<SignalKind> {
		if self.signals.is_empty() {
			return None;
		}

		let (kind, _, _) = futures::future::select_all(
			self.signals
				.iter_mut()
				.map(|(kind, signal)| Box::pin(signal.recv().map(|_| *kind))),
		)
		.await;

		Some(kind)
	}
}
