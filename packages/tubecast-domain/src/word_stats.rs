use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
	pub word: String,
	pub count: u64,
}

/// Lowercased word frequencies over all texts, most frequent first and alphabetical on ties.
pub fn count_words<I, S>(texts: I) -> Vec<WordCount>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut counts: HashMap<String, u64> = HashMap::new();

	for text in texts {
		let lowered = text.as_ref().to_lowercase();

		for word in lowered.split(|ch: char| !(ch.is_alphanumeric() || ch == '_')) {
			if word.is_empty() {
				continue;
			}

			*counts.entry(word.to_string()).or_default() += 1;
		}
	}

	let mut stats: Vec<WordCount> =
		counts.into_iter().map(|(word, count)| WordCount { word, count }).collect();

	stats.sort_by(|left, right| right.count.cmp(&left.count).then_with(|| left.word.cmp(&right.word)));

	stats
}
