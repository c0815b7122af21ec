use std::{
	collections::HashMap,
	fmt,
	sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use tubecast_domain::SearchUpdate;

use crate::{
	Error, Result,
	scheduler::{RefreshScheduler, SchedulerState},
};

pub type UpdateReceiver = mpsc::Receiver<Arc<SearchUpdate>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(Uuid);
impl SubscriberId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}
impl Default for SubscriberId {
	fn default() -> Self {
		Self::new()
	}
}
impl fmt::Display for SubscriberId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

/// Outbound half of one client connection.
#[derive(Debug, Clone)]
pub struct Subscriber {
	id: SubscriberId,
	sender: mpsc::Sender<Arc<SearchUpdate>>,
}
impl Subscriber {
	pub fn channel(buffer: usize) -> (Self, UpdateReceiver) {
		let (sender, receiver) = mpsc::channel(buffer.max(1));

		(Self { id: SubscriberId::new(), sender }, receiver)
	}

	pub fn id(&self) -> SubscriberId {
		self.id
	}

	pub fn is_closed(&self) -> bool {
		self.sender.is_closed()
	}

	/// Never waits. A full buffer drops this update for this subscriber only.
	pub fn deliver(&self, update: Arc<SearchUpdate>) -> Result<()> {
		self.sender.try_send(update).map_err(|err| {
			let reason = match err {
				TrySendError::Full(_) => "outbound buffer is full",
				TrySendError::Closed(_) => "connection is closed",
			};

			Error::Delivery { message: format!("Subscriber {}: {reason}.", self.id) }
		})
	}
}

struct Inner {
	subscribers: HashMap<SubscriberId, Subscriber>,
	scheduler: RefreshScheduler,
}

/// Connected clients plus the refresh scheduler whose lifetime follows them.
///
/// Membership and the scheduler share one lock, so the 0 -> 1 and 1 -> 0 transitions start and
/// stop the scheduler exactly once each.
pub struct ClientRegistry {
	inner: Mutex<Inner>,
}
impl ClientRegistry {
	pub fn new(scheduler: RefreshScheduler) -> Self {
		Self { inner: Mutex::new(Inner { subscribers: HashMap::new(), scheduler }) }
	}

	/// Returns `false` if the subscriber was already registered.
	pub fn subscribe(&self, subscriber: Subscriber) -> bool {
		let mut inner = self.lock();
		let id = subscriber.id();

		if inner.subscribers.contains_key(&id) {
			return false;
		}

		inner.subscribers.insert(id, subscriber);

		if inner.subscribers.len() == 1 {
			inner.scheduler.start();
		}

		tracing::info!(subscriber = %id, clients = inner.subscribers.len(), "Client subscribed.");

		true
	}

	/// Unknown ids are ignored.
	pub fn unsubscribe(&self, id: SubscriberId) -> bool {
		let mut inner = self.lock();

		if inner.subscribers.remove(&id).is_none() {
			return false;
		}
		if inner.subscribers.is_empty() {
			inner.scheduler.stop();
		}

		tracing::info!(subscriber = %id, clients = inner.subscribers.len(), "Client unsubscribed.");

		true
	}

	pub fn contains(&self, id: SubscriberId) -> bool {
		self.lock().subscribers.contains_key(&id)
	}

	pub fn size(&self) -> usize {
		self.lock().subscribers.len()
	}

	pub fn scheduler_state(&self) -> SchedulerState {
		self.lock().scheduler.state()
	}

	/// Visits the subscribers registered at call time. The lock is released before `f` runs, so
	/// `f` may subscribe or unsubscribe.
	pub fn for_each<F>(&self, mut f: F)
	where
		F: FnMut(&Subscriber),
	{
		let subscribers: Vec<Subscriber> = self.lock().subscribers.values().cloned().collect();

		for subscriber in &subscribers {
			f(subscriber);
		}
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
