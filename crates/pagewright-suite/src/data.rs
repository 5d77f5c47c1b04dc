//! Random test data.
//!
//! Every generator takes the RNG explicitly so tests can seed it; scenarios pass
//! `rand::thread_rng()`.

use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
    "Radia", "Tim", "Hedy", "John", "Katherine", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra", "Perlman", "Berners-Lee", "Lamarr", "Backus", "Johnson", "Wirth",
];

const STREETS: &[&str] = &[
    "Maple", "Oak", "Cedar", "Pine", "Elm", "Willow", "Birch", "Chestnut", "Lake", "Hill",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court"];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*";

/// Length of generated account passwords.
pub const PASSWORD_LENGTH: usize = 12;

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn pick_byte<R: Rng + ?Sized>(rng: &mut R, bytes: &[u8]) -> u8 {
    bytes[rng.gen_range(0..bytes.len())]
}

pub fn full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// `first.last<n>@domain`, lowercased, on a reserved example domain.
pub fn email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = pick(rng, FIRST_NAMES).to_lowercase();
    let last = pick(rng, LAST_NAMES).to_lowercase().replace('-', "");
    let n: u16 = rng.gen_range(1..1000);
    format!("{}.{}{}@{}", first, last, n, pick(rng, EMAIL_DOMAINS))
}

pub fn street_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: u16 = rng.gen_range(1..10_000);
    format!(
        "{} {} {}",
        number,
        pick(rng, STREETS),
        pick(rng, STREET_SUFFIXES)
    )
}

/// `user_NNNN` with a four-digit suffix.
pub fn username<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("user_{}", rng.gen_range(1000..=9999))
}

/// Password of `length` characters (at least four) with at least one uppercase letter,
/// one lowercase letter, one digit and one of `!@#$%^&*`.
pub fn strong_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let classes = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL];
    let mut chars = Vec::with_capacity(length.max(classes.len()));
    for class in classes {
        chars.push(pick_byte(rng, class));
    }

    let all = classes.concat();
    while chars.len() < length {
        chars.push(pick_byte(rng, &all));
    }
    chars.shuffle(rng);

    chars.into_iter().map(char::from).collect()
}
