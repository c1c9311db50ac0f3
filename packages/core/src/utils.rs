// ABOUTME: Shared utility functions for ProfileHub
// ABOUTME: Default nickname generation

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "clever", "jolly", "brave", "sly", "gentle", "swift", "quiet", "bright", "calm", "witty",
];

const ANIMALS: &[&str] = &[
    "panda", "fox", "raccoon", "koala", "lion", "otter", "falcon", "badger", "heron", "lynx",
];

/// Generate a default nickname such as `jolly_lion_403`.
///
/// Output always satisfies the nickname rules (word characters only, longer
/// than the minimum length).
pub fn generate_nickname() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("happy");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("cat");
    let number: u16 = rng.gen_range(0..1000);
    format!("{}_{}_{}", adjective, animal, number)
}
