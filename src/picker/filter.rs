/// Keep the items containing `query`, ignoring case, in their original order.
///
/// An empty query returns the source unchanged. There is no ranking.
pub fn filter(source: &[String], query: &str) -> Vec<String> {
	matching_indices(source, query)
		.into_iter()
		.map(|index| source[index].clone())
		.collect()
}

/// Positions in `source` of the items [`filter`] keeps.
pub fn matching_indices(source: &[String], query: &str) -> Vec<usize> {
	let needle = query.to_lowercase();
	source
		.iter()
		.enumerate()
		.filter(|(_, item)| needle.is_empty() || item.to_lowercase().contains(&needle))
		.map(|(index, _)| index)
		.collect()
}
