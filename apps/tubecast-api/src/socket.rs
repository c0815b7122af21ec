//! One task per WebSocket client: inbound query frames in, search updates out.

use std::sync::Arc;

use axum::{
	extract::{
		State, WebSocketUpgrade,
		ws::{Message, WebSocket},
	},
	response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;

use tubecast_service::{Connection, Error, SubscriberId, TubecastService};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorFrame<'a> {
	error: &'a str,
}

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
	ws.on_upgrade(move |socket| serve(socket, state.service))
}

pub async fn serve(socket: WebSocket, service: Arc<TubecastService>) {
	let Connection { id, mut updates } = service.connect();
	let (mut sink, mut stream) = socket.split();

	loop {
		tokio::select! {
			update = updates.recv() => {
				let Some(update) = update else {
					break;
				};
				let payload = match serde_json::to_string(update.as_ref()) {
					Ok(payload) => payload,
					Err(err) => {
						tracing::error!(subscriber = %id, error = %err, "Failed to encode search update.");

						continue;
					},
				};

				if sink.send(Message::Text(payload.into())).await.is_err() {
					break;
				}
			},
			frame = stream.next() => match frame {
				Some(Ok(Message::Text(text))) => {
					let Some(reply) = handle_frame(&service, id, text.as_str()) else {
						continue;
					};

					if sink.send(Message::Text(reply.into())).await.is_err() {
						break;
					}
				},
				Some(Ok(Message::Close(_))) | None => break,
				Some(Ok(_)) => {},
				Some(Err(err)) => {
					tracing::debug!(subscriber = %id, error = %err, "WebSocket receive failed.");

					break;
				},
			},
		}
	}

	service.disconnect(id);
}

/// Returns the frame to send back to this client only, if any.
pub(crate) fn handle_frame(service: &TubecastService, id: SubscriberId, text: &str) -> Option<String> {
	let Some(query) = query_of(text) else {
		tracing::debug!(subscriber = %id, frame = text, "Ignoring malformed frame.");

		return None;
	};

	match service.handle_query(&query) {
		Ok(_) => None,
		Err(Error::InvalidQuery { message }) => serde_json::to_string(&ErrorFrame { error: &message })
			.inspect_err(|err| {
				tracing::error!(subscriber = %id, error = %err, "Failed to encode error frame.");
			})
			.ok(),
		Err(err) => {
			tracing::warn!(subscriber = %id, error = %err, "Query failed.");

			None
		},
	}
}

/// Accepts only a JSON object whose `query` member is a string.
fn query_of(text: &str) -> Option<String> {
	let Ok(Value::Object(mut frame)) = serde_json::from_str::<Value>(text) else {
		return None;
	};

	match frame.remove("query")? {
		Value::String(query) => Some(query),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tubecast_domain::{ChannelProfile, VideoDetails, VideoSummary};
	use tubecast_service::{BoxFuture, VideoCatalog, VideoSearch};

	use super::*;

	struct EmptySearch;
	impl VideoSearch for EmptySearch {
		fn search<'a>(
			&'a self,
			_query: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>> {
			Box::pin(async { Ok(Vec::new()) })
		}
	}
	impl VideoCatalog for EmptySearch {
		fn channel<'a>(
			&'a self,
			channel_id: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<ChannelProfile>> {
			Box::pin(async move { Err(color_eyre::eyre::eyre!("No channel {channel_id}.")) })
		}

		fn videos_by_tag<'a>(
			&'a self,
			_tag: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<Vec<VideoSummary>>> {
			Box::pin(async { Ok(Vec::new()) })
		}

		fn video<'a>(&'a self, video_id: &'a str) -> BoxFuture<'a, color_eyre::Result<VideoDetails>> {
			Box::pin(async move { Err(color_eyre::eyre::eyre!("No video {video_id}.")) })
		}

		fn search_details<'a>(
			&'a self,
			_query: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<Vec<VideoDetails>>> {
			Box::pin(async { Ok(Vec::new()) })
		}
	}

	fn service() -> TubecastService {
		let cache = tubecast_config::Cache {
			refresh_interval_secs: 3_600,
			..tubecast_config::Cache::default()
		};

		TubecastService::new(&cache, Arc::new(EmptySearch))
	}

	#[tokio::test]
	async fn malformed_frames_are_ignored() {
		let service = service();
		let id = SubscriberId::new();

		for text in [
			"not json",
			"{}",
			r#"{"query": 42}"#,
			r#"{"query": ["akka"]}"#,
			r#"["akka"]"#,
			r#""akka""#,
		] {
			assert_eq!(handle_frame(&service, id, text), None);
		}

		assert!(service.cache().is_empty());
	}

	#[tokio::test]
	async fn blank_query_gets_an_error_frame() {
		let service = service();
		let reply = handle_frame(&service, SubscriberId::new(), r#"{"query": "  "}"#)
			.expect("Blank query must be answered.");

		assert_eq!(reply, r#"{"error":"Query cannot be empty."}"#);
		assert!(service.cache().is_empty());
	}

	#[tokio::test]
	async fn query_frame_starts_tracking() {
		let service = service();

		assert_eq!(handle_frame(&service, SubscriberId::new(), r#"{"query": "akka"}"#), None);

		tokio::time::sleep(Duration::from_millis(10)).await;

		assert!(service.cache().snapshot("akka").is_some());
		assert!(service.cache().is_fresh("akka"));
	}
}
