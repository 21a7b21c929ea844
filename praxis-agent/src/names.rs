//! Human-friendly process names.

use rand::seq::IndexedRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "agile", "amber", "bold", "brave", "bright", "calm", "clever", "cosmic", "crisp", "daring",
    "deft", "eager", "earnest", "fierce", "fleet", "gentle", "happy", "hardy", "keen", "kind",
    "lively", "lucid", "merry", "mighty", "nimble", "noble", "patient", "placid", "plucky",
    "proud", "quick", "quiet", "rapid", "sage", "sharp", "shrewd", "sleek", "spry", "steady",
    "stout", "sunny", "swift", "tidy", "tranquil", "vivid", "warm", "wise", "witty",
];

const SURNAMES: &[&str] = &[
    "agnesi", "archimedes", "babbage", "bohr", "boole", "carson", "cori", "curie", "darwin",
    "dirac", "euclid", "euler", "faraday", "fermi", "feynman", "fourier", "franklin", "galileo",
    "gauss", "goodall", "hamilton", "hawking", "heisenberg", "herschel", "hopper", "hypatia",
    "kepler", "lamarr", "laplace", "leavitt", "lovelace", "maxwell", "meitner", "mendel",
    "mirzakhani", "newton", "noether", "pasteur", "planck", "ramanujan", "ride", "sagan",
    "somerville", "tesla", "turing", "wiles", "wu", "yalow",
];

/// A two-token "happy-yalow"-style name.
pub fn friendly_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).unwrap_or(&"plain");
    let surname = SURNAMES.choose(&mut rng).unwrap_or(&"doe");
    format!("{adjective}-{surname}")
}

/// A friendly name not already taken; collisions get a random suffix.
pub fn unique_name(taken: impl Fn(&str) -> bool) -> String {
    let name = friendly_name();
    if !taken(&name) {
        return name;
    }
    let mut rng = rand::rng();
    loop {
        let candidate = format!("{name}-{:04x}", rng.random_range(0..0x1_0000u32));
        if !taken(&candidate) {
            return candidate;
        }
    }
}
