const ELLIPSIS: &str = "...";

/// Char index of the first case-insensitive occurrence of `needle` in `haystack`.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
	let haystack: Vec<char> = haystack.chars().collect();
	let needle: Vec<char> = needle.chars().collect();

	find_chars(&haystack, &needle)
}

/// Window of `radius` chars on each side of the first occurrence of `query`. When the query is
/// not present verbatim, the first `2 * radius` chars followed by an ellipsis.
pub fn excerpt(field: &str, query: &str, radius: usize) -> String {
	let chars: Vec<char> = field.chars().collect();
	let needle: Vec<char> = query.chars().collect();

	match find_chars(&chars, &needle) {
		Some(start) => {
			let from = start.saturating_sub(radius);
			let to = (start + needle.len() + radius).min(chars.len());

			chars[from..to].iter().collect()
		},
		None => {
			let to = (radius * 2).min(chars.len());
			let mut out: String = chars[..to].iter().collect();

			out.push_str(ELLIPSIS);

			out
		},
	}
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
	if needle.is_empty() {
		return Some(0);
	}
	if needle.len() > haystack.len() {
		return None;
	}

	(0..=haystack.len() - needle.len()).find(|&start| {
		haystack[start..start + needle.len()]
			.iter()
			.zip(needle)
			.all(|(a, b)| chars_eq_ignore_case(*a, *b))
	})
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
	a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn centers_window_on_first_match() {
		let field = format!("{}Panic attack{}", "a".repeat(60), "b".repeat(60));
		let out = excerpt(&field, "panic", 50);

		assert_eq!(out, format!("{}Panic{}", "a".repeat(50), format!(" attack{}", "b".repeat(43))));
	}

	#[test]
	fn clamps_window_at_edges() {
		assert_eq!(excerpt("Sleep was poor.", "sleep", 50), "Sleep was poor.");
	}

	#[test]
	fn falls_back_to_prefix_with_ellipsis() {
		let field = "x".repeat(150);

		assert_eq!(excerpt(&field, "missing", 50), format!("{}...", "x".repeat(100)));
		assert_eq!(excerpt("short", "missing", 50), "short...");
	}

	#[test]
	fn handles_multibyte_text() {
		assert_eq!(find_case_insensitive("Café ÉTÉ", "été"), Some(5));
		assert_eq!(excerpt("naïve café", "CAFÉ", 2), "e café");
	}
}
