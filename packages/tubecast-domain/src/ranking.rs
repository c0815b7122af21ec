use std::{cmp::Ordering, collections::HashSet};

use crate::VideoSummary;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Newest first; equal timestamps fall back to ascending id so the order is total.
pub fn compare_recency(left: &VideoSummary, right: &VideoSummary) -> Ordering {
	right.published_at.cmp(&left.published_at).then_with(|| left.id.cmp(&right.id))
}

/// Appends every incoming item whose id is not already present, re-ranks, and truncates to
/// `limit`. Returns how many items were appended before truncation.
pub fn merge_ranked(
	current: &mut Vec<VideoSummary>,
	incoming: impl IntoIterator<Item = VideoSummary>,
	limit: usize,
) -> usize {
	let mut seen: HashSet<String> = current.iter().map(|video| video.id.clone()).collect();
	let mut appended = 0;

	for video in incoming {
		if seen.insert(video.id.clone()) {
			current.push(video);

			appended += 1;
		}
	}

	current.sort_by(compare_recency);
	current.truncate(limit);

	appended
}

pub fn is_ranked(results: &[VideoSummary], limit: usize) -> bool {
	if results.len() > limit {
		return false;
	}

	let mut seen = HashSet::new();

	results.iter().all(|video| seen.insert(video.id.as_str()))
		&& results.windows(2).all(|pair| compare_recency(&pair[0], &pair[1]) != Ordering::Greater)
}
