//! Synthetic token generator.
//!
//! Produces plausible-looking token rows for the mock feed. Output is not
//! reproducible across calls; only id uniqueness is guaranteed.

use crate::types::{Token, TokenStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const TOKEN_NAMES: &[(&str, &str)] = &[
    ("Grok", "Rainbow Grok"),
    ("$JUAN", "JUAN"),
    ("Wizdaddy", "Wizdaddy"),
    ("TwinTwin", "TwinTwin"),
    ("Google Ai", "Google Coin"),
    ("EIG", "EIG Ponzi"),
    ("PEPE2026", "PEPE2026"),
    ("HORSEWHALE", "HORSE WHALE"),
    ("Toyota", "Toyota"),
    ("Day1", "Bullish Start"),
    ("MetaMak", "MetaMask AI2026"),
    ("SolanaMax", "SOLMAX"),
    ("MemeKing", "MKING"),
    ("DefiPunk", "DPUNK"),
    ("CryptoWhale", "CWHALE"),
    ("MoonShot", "MOON"),
    ("RocketFi", "ROCKET"),
    ("DiamondHands", "DHAND"),
    ("PepeMax", "PMAX"),
    ("ShibaElite", "SELITE"),
];

const AVATAR_GRADIENTS: &[&str] = &[
    "from-cyan-500 to-blue-600",
    "from-purple-500 to-pink-600",
    "from-green-500 to-teal-600",
    "from-orange-500 to-red-600",
    "from-yellow-500 to-orange-600",
    "from-indigo-500 to-purple-600",
    "from-pink-500 to-rose-600",
    "from-teal-500 to-cyan-600",
];

const ADDRESS_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const HOLD_TIME_UNITS: &[&str] = &["m", "mo", "h", "d"];

/// Bumped on every generation call so ids never repeat, even when two calls
/// land in the same millisecond.
static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Generate `count` fresh tokens using the thread-local RNG.
pub fn generate_tokens(count: usize) -> Vec<Token> {
    generate_tokens_with(&mut rand::thread_rng(), count)
}

/// Generate `count` fresh tokens from the given RNG.
pub fn generate_tokens_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Token> {
    let generation = GENERATION.fetch_add(1, Ordering::Relaxed);
    let created_at = chrono::Utc::now().timestamp_millis();
    (0..count)
        .map(|index| generate_token(&mut *rng, index, created_at, generation))
        .collect()
}

fn generate_token<R: Rng + ?Sized>(
    rng: &mut R,
    index: usize,
    created_at: i64,
    generation: u64,
) -> Token {
    let (name, ticker) = TOKEN_NAMES[index % TOKEN_NAMES.len()];
    let (age, age_seconds) = random_age(rng);

    let status = if rng.gen_bool(0.5) {
        TokenStatus::Positive
    } else if rng.gen_bool(0.5) {
        TokenStatus::Negative
    } else {
        TokenStatus::Neutral
    };

    let timer = rng.gen_bool(0.2).then(|| {
        format!(
            "{}:{:02}:{:02}",
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60)
        )
    });

    Token {
        id: format!("token-{}-{}-{}", index, created_at, generation),
        name: name.to_string(),
        ticker: ticker.to_string(),
        avatar: AVATAR_GRADIENTS[index % AVATAR_GRADIENTS.len()].to_string(),
        verified: rng.gen_bool(0.3),
        age,
        age_seconds,
        has_twitter: rng.gen_bool(0.7),
        has_website: rng.gen_bool(0.5),
        has_telegram: rng.gen_bool(0.4),
        holders: rng.gen_range(10..510),
        pro_traders: rng.gen_range(0..20),
        transactions: rng.gen_range(10..510),
        comments: rng.gen_range(0..15),
        dev_percent: rng.gen_range(0..100) as f64,
        bundled_percent: rng.gen_range(0..100) as f64,
        insider_percent: rng.gen_range(0..100) as f64,
        sniper_percent: rng.gen_range(0..100) as f64,
        dev_hold_time: Some(random_hold_time(rng)),
        bundled_hold_time: Some(random_hold_time(rng)),
        market_cap: rng.gen_range(5_000..2_005_000) as f64,
        volume: rng.gen_range(100..50_100) as f64,
        liquidity: rng.gen_range(500..5_500) as f64,
        fee: (rng.gen_range(0.0..0.1_f64) * 1000.0).round() / 1000.0,
        price: rng.gen_range(0.000_001..0.001),
        price_change: rng.gen_range(-10.0..10.0),
        buy_amount: rng.gen_range(1..=5),
        bonding_curve: Some(rng.gen_range(70..100) as f64),
        wallet_address: random_wallet_address(rng),
        status,
        timer,
    }
}

/// Age under two hours, rendered in its largest whole unit.
fn random_age<R: Rng + ?Sized>(rng: &mut R) -> (String, u64) {
    let seconds: u64 = rng.gen_range(0..7200);
    let label = if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}h", seconds / 3600)
    };
    (label, seconds)
}

fn random_wallet_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut part = || -> String {
        (0..4)
            .map(|_| ADDRESS_CHARS[rng.gen_range(0..ADDRESS_CHARS.len())] as char)
            .collect()
    };
    let prefix = part();
    let suffix = part();
    format!("{}...{}", prefix, suffix)
}

fn random_hold_time<R: Rng + ?Sized>(rng: &mut R) -> String {
    let amount = rng.gen_range(1..=12);
    let unit = HOLD_TIME_UNITS.choose(rng).copied().unwrap_or("m");
    format!("{}{}", amount, unit)
}
