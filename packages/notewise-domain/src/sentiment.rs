pub const POSITIVE_KEYWORDS: [&str; 6] =
	["better", "good", "happy", "improved", "progress", "hope"];
pub const NEGATIVE_KEYWORDS: [&str; 6] = ["worse", "bad", "sad", "difficult", "struggle", "hard"];

/// Number of positive keywords contained in the text minus the number of negative ones.
///
/// Containment is a case-insensitive substring test, so "hopeful" counts for "hope" and each
/// keyword contributes at most once.
pub fn sentiment_score(text: &str) -> i32 {
	let lower = text.to_lowercase();
	let positive = POSITIVE_KEYWORDS.iter().filter(|word| lower.contains(*word)).count();
	let negative = NEGATIVE_KEYWORDS.iter().filter(|word| lower.contains(*word)).count();

	positive as i32 - negative as i32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn balances_positive_and_negative_keywords() {
		assert_eq!(sentiment_score("Things feel better and I have hope."), 2);
		assert_eq!(sentiment_score("A hard, difficult week. Felt sad."), -3);
		assert_eq!(sentiment_score("Good day but a bad night."), 0);
		assert_eq!(sentiment_score(""), 0);
	}

	#[test]
	fn matches_substrings_case_insensitively() {
		assert_eq!(sentiment_score("HOPEFUL"), 1);
		// "hardly" still contains "hard".
		assert_eq!(sentiment_score("hardly"), -1);
	}
}
