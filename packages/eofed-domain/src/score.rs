/// Score assigned to every member of a batch whose raw scores carry no spread.
pub const DEGENERATE_SCORE: f32 = 0.5;

/// Anything that carries a backend-local relevance score.
pub trait Scored {
	fn score(&self) -> f32;

	fn set_score(&mut self, score: f32);
}

impl Scored for f32 {
	fn score(&self) -> f32 {
		*self
	}

	fn set_score(&mut self, score: f32) {
		*self = score;
	}
}

/// Min-max rescales one batch onto `[0, 1]`.
///
/// Raw scales are backend specific, so callers must pass a single backend's batch. When the
/// batch has no spread (including a single element) every score becomes [`DEGENERATE_SCORE`].
/// Non-finite raw scores are treated as the batch minimum.
pub fn normalize<T: Scored>(batch: &mut [T]) {
	let finite = || batch.iter().map(Scored::score).filter(|score| score.is_finite());
	let min = finite().fold(f32::INFINITY, f32::min);
	let max = finite().fold(f32::NEG_INFINITY, f32::max);

	if !min.is_finite() || !max.is_finite() || max == min {
		for item in batch.iter_mut() {
			item.set_score(DEGENERATE_SCORE);
		}

		return;
	}

	let range = max - min;

	for item in batch.iter_mut() {
		let raw = item.score();
		let raw = if raw.is_finite() { raw } else { min };

		item.set_score(((raw - min) / range).clamp(0.0, 1.0));
	}
}
