//! Shuffle algorithm for queue randomization
//!
//! Pure random (Fisher-Yates) shuffle of a session's pending tracks.

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffle a slice in place with the thread-local RNG
///
/// Each track has equal probability of appearing at any position.
pub fn shuffle_tracks<T>(tracks: &mut [T]) {
    let mut rng = thread_rng();
    shuffle_with(tracks, &mut rng);
}

/// Shuffle a slice in place with a caller-supplied RNG
///
/// Zero- and one-element slices come back unchanged.
pub fn shuffle_with<T, R: Rng + ?Sized>(tracks: &mut [T], rng: &mut R) {
    tracks.shuffle(rng);
}
