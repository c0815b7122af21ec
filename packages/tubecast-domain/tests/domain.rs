use time::{OffsetDateTime, macros::datetime};

use tubecast_domain::{
	ChannelInfo, ChannelProfile, SearchUpdate, VideoSummary,
	ranking::{self, DEFAULT_MAX_RESULTS},
	readability, word_stats,
};

fn video(id: &str, published_at: OffsetDateTime) -> VideoSummary {
	VideoSummary {
		id: id.to_string(),
		title: format!("Video {id}"),
		description: format!("Description of {id}"),
		channel_title: "Lightbend".to_string(),
		channel_id: "UCabc".to_string(),
		thumbnail_url: format!("https://i.ytimg.com/vi/{id}/default.jpg"),
		published_at,
	}
}

fn ids(results: &[VideoSummary]) -> Vec<&str> {
	results.iter().map(|video| video.id.as_str()).collect()
}

#[test]
fn merge_orders_newest_first_and_keeps_existing_items() {
	let a = video("A", datetime!(2024-01-01 0:00 UTC));
	let b = video("B", datetime!(2024-01-03 0:00 UTC));
	let c = video("C", datetime!(2024-01-02 0:00 UTC));
	let mut current = Vec::new();

	ranking::merge_ranked(&mut current, [a.clone(), b], DEFAULT_MAX_RESULTS);

	assert_eq!(ids(&current), ["B", "A"]);

	let appended = ranking::merge_ranked(&mut current, [a, c], DEFAULT_MAX_RESULTS);

	assert_eq!(appended, 1);
	assert_eq!(ids(&current), ["B", "C", "A"]);
}

#[test]
fn merging_the_same_item_twice_is_a_no_op() {
	let a = video("A", datetime!(2024-01-01 0:00 UTC));
	let mut current = Vec::new();

	ranking::merge_ranked(&mut current, [a.clone()], DEFAULT_MAX_RESULTS);

	let appended = ranking::merge_ranked(&mut current, [a], DEFAULT_MAX_RESULTS);

	assert_eq!(appended, 0);
	assert_eq!(ids(&current), ["A"]);
}

#[test]
fn merge_keeps_only_the_most_recent_items() {
	let mut current = Vec::new();

	for day in 1..=11_u8 {
		let published_at = datetime!(2024-01-01 0:00 UTC) + time::Duration::days(i64::from(day));

		ranking::merge_ranked(
			&mut current,
			[video(&format!("v{day:02}"), published_at)],
			DEFAULT_MAX_RESULTS,
		);
	}

	assert_eq!(current.len(), DEFAULT_MAX_RESULTS);
	assert_eq!(current.first().map(|video| video.id.as_str()), Some("v11"));
	assert_eq!(current.last().map(|video| video.id.as_str()), Some("v02"));
	assert!(ranking::is_ranked(&current, DEFAULT_MAX_RESULTS));
}

#[test]
fn ranked_check_rejects_out_of_order_results() {
	let older = video("A", datetime!(2024-01-01 0:00 UTC));
	let newer = video("B", datetime!(2024-01-03 0:00 UTC));

	assert!(ranking::is_ranked(&[newer.clone(), older.clone()], 10));
	assert!(!ranking::is_ranked(&[older, newer.clone()], 10));
	assert!(!ranking::is_ranked(&[newer.clone(), newer], 10));
}

#[test]
fn update_serializes_with_wire_field_names() {
	let update = SearchUpdate {
		query: "akka".to_string(),
		results: vec![video("A", datetime!(2024-01-01 12:30 UTC))],
	};
	let json = serde_json::to_value(&update).expect("Failed to serialize update.");
	let item = &json["results"][0];

	assert_eq!(json["query"], "akka");
	assert_eq!(item["channelTitle"], "Lightbend");
	assert_eq!(item["channelId"], "UCabc");
	assert_eq!(item["thumbnail"], "https://i.ytimg.com/vi/A/default.jpg");
	assert_eq!(item["publishedAt"], "2024-01-01T12:30:00Z");
	assert!(item.get("thumbnailUrl").is_none());
}

#[test]
fn channel_profile_serializes_with_wire_field_names() {
	let profile = ChannelProfile {
		channel: ChannelInfo {
			id: "UCabc".to_string(),
			title: "Lightbend".to_string(),
			description: "Reactive systems.".to_string(),
			thumbnail_url: "https://yt3.ggpht.com/UCabc.jpg".to_string(),
			subscriber_count: None,
			video_count: Some(42),
			view_count: Some(1_000),
		},
		videos: vec![video("A", datetime!(2024-01-01 12:30 UTC))],
	};
	let json = serde_json::to_value(&profile).expect("Failed to serialize profile.");

	assert_eq!(json["channel"]["thumbnail"], "https://yt3.ggpht.com/UCabc.jpg");
	assert!(json["channel"]["subscriberCount"].is_null());
	assert_eq!(json["channel"]["videoCount"], 42);
	assert_eq!(json["videos"][0]["id"], "A");
}

#[test]
fn syllables_follow_vowel_groups() {
	assert_eq!(readability::count_syllables("the"), 1);
	assert_eq!(readability::count_syllables("reading"), 2);
	assert_eq!(readability::count_syllables("beautiful"), 3);
	assert_eq!(readability::count_syllables("rhythm"), 1);
	assert_eq!(readability::count_syllables("123"), 1);
}

#[test]
fn readability_scores_simple_sentence() {
	let score = readability::score("The cat sat.");

	assert!((score.flesch_ease - 119.19).abs() < 1e-9, "ease was {}", score.flesch_ease);
	assert!((score.flesch_grade + 2.62).abs() < 1e-9, "grade was {}", score.flesch_grade);
}

#[test]
fn readability_of_empty_text_uses_zero_rates() {
	let score = readability::score("");

	assert!((score.flesch_ease - 206.835).abs() < 1e-9);
	assert!((score.flesch_grade + 15.59).abs() < 1e-9);
}

#[test]
fn readability_caps_batch_size() {
	let texts = vec!["Short text."; readability::MAX_DESCRIPTIONS + 5];

	assert_eq!(readability::score_all(&texts).len(), readability::MAX_DESCRIPTIONS);
}

#[test]
fn word_stats_count_case_insensitively() {
	let stats = word_stats::count_words(["Akka streams, Akka actors!", "streams of actors"]);
	let pairs: Vec<(&str, u64)> =
		stats.iter().map(|entry| (entry.word.as_str(), entry.count)).collect();

	assert_eq!(pairs, [("actors", 2), ("akka", 2), ("streams", 2), ("of", 1)]);
}
