use std::{sync::Weak, time::Duration};

use tokio::{
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};

/// Work performed on every scheduler tick.
pub trait RefreshPass
where
	Self: Send + Sync,
{
	fn run_pass(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
	Stopped,
	Running,
}

/// Periodic refresh timer. Only the client registry transitions it, under its own lock.
pub struct RefreshScheduler {
	period: Duration,
	pass: Weak<dyn RefreshPass>,
	task: Option<JoinHandle<()>>,
}
impl RefreshScheduler {
	pub fn new(period: Duration, pass: Weak<dyn RefreshPass>) -> Self {
		Self { period, pass, task: None }
	}

	pub fn state(&self) -> SchedulerState {
		match self.task {
			Some(_) => SchedulerState::Running,
			None => SchedulerState::Stopped,
		}
	}

	/// Must be called from inside a tokio runtime.
	pub(crate) fn start(&mut self) -> bool {
		if self.task.is_some() {
			return false;
		}

		self.task = Some(tokio::spawn(tick_loop(self.period, self.pass.clone())));

		tracing::info!(period_ms = self.period.as_millis() as u64, "Refresh scheduler started.");

		true
	}

	/// Cancels the timer only. Fetches spawned by earlier ticks run to completion.
	pub(crate) fn stop(&mut self) -> bool {
		let Some(task) = self.task.take() else {
			return false;
		};

		task.abort();

		tracing::info!("Refresh scheduler stopped.");

		true
	}
}
impl Drop for RefreshScheduler {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}

async fn tick_loop(period: Duration, pass: Weak<dyn RefreshPass>) {
	let mut ticker = time::interval(period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		let Some(pass) = pass.upgrade() else {
			tracing::debug!("Refresh target dropped, ending tick loop.");

			break;
		};

		pass.run_pass();
	}
}
