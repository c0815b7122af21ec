//! Flesch reading-ease and grade-level scores for free text.

use serde::Serialize;

pub const MAX_DESCRIPTIONS: usize = 50;

const VOWELS: &[u8] = b"aeiouy";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
	pub flesch_ease: f64,
	pub flesch_grade: f64,
}

pub fn score(text: &str) -> Readability {
	let wps = words_per_sentence(text);
	let spw = syllables_per_word(text);

	Readability {
		flesch_ease: 206.835 - 1.015 * wps - 84.6 * spw,
		flesch_grade: 0.39 * wps + 11.8 * spw - 15.59,
	}
}

/// Scores at most [`MAX_DESCRIPTIONS`] texts, in input order.
pub fn score_all<S>(texts: &[S]) -> Vec<Readability>
where
	S: AsRef<str>,
{
	texts.iter().take(MAX_DESCRIPTIONS).map(|text| score(text.as_ref())).collect()
}

pub fn count_syllables(word: &str) -> usize {
	let letters: Vec<u8> = word
		.bytes()
		.map(|byte| byte.to_ascii_lowercase())
		.filter(u8::is_ascii_lowercase)
		.collect();
	let mut count = 0_usize;
	let mut last_was_vowel = false;

	for byte in &letters {
		let is_vowel = VOWELS.contains(byte);

		if is_vowel && !last_was_vowel {
			count += 1;
		}

		last_was_vowel = is_vowel;
	}

	if letters.last() == Some(&b'e') {
		count = count.saturating_sub(1);
	}

	count.max(1)
}

fn words_per_sentence(text: &str) -> f64 {
	let sentences =
		text.split(['.', '!', '?']).filter(|sentence| !sentence.trim().is_empty()).count();
	let words = text.split_whitespace().count();

	if sentences == 0 {
		return 0.0;
	}

	words as f64 / sentences as f64
}

fn syllables_per_word(text: &str) -> f64 {
	let mut words = 0_usize;
	let mut syllables = 0_usize;

	for word in text.split_whitespace() {
		words += 1;
		syllables += count_syllables(word);
	}

	if words == 0 {
		return 0.0;
	}

	syllables as f64 / words as f64
}
