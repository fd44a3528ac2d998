//! Demo data generator for the `seed` command

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::types::NewUser;
use crate::data::{DataError, UserRepository};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
    "Radia", "Donald", "Hedy", "Niklaus", "Katherine", "John",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra", "Perlman", "Knuth", "Lamarr", "Wirth", "Johnson", "McCarthy",
];

const POST_TOPICS: &[&str] = &[
    "Notes on",
    "Thoughts about",
    "A short guide to",
    "Why I like",
    "Lessons from",
];

const POST_SUBJECTS: &[&str] = &[
    "compilers",
    "databases",
    "type systems",
    "networking",
    "testing",
    "data grids",
    "CSV files",
];

/// Up to one year back
const MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// What a seed run inserted
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: u32,
    pub posts: u32,
    /// Generated emails that already existed
    pub skipped: u32,
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Random user; the email carries a numeric suffix so reruns rarely collide
pub fn generate_user(rng: &mut StdRng, now: i64) -> NewUser {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let suffix: u32 = rng.gen_range(1..100_000);

    let email_verified_at = if rng.gen_bool(0.7) {
        Some(now - rng.gen_range(0..MAX_AGE_SECS))
    } else {
        None
    };

    NewUser {
        name: format!("{} {}", first, last),
        email: format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            suffix
        ),
        email_verified_at,
    }
}

pub fn generate_post_title(rng: &mut StdRng) -> String {
    format!("{} {}", pick(rng, POST_TOPICS), pick(rng, POST_SUBJECTS))
}

/// Insert `users` random users with `posts_per_user` posts each
pub async fn seed_database(
    repo: &dyn UserRepository,
    rng: &mut StdRng,
    users: u32,
    posts_per_user: u32,
) -> Result<SeedSummary> {
    let now = Utc::now().timestamp();
    let mut summary = SeedSummary::default();

    for _ in 0..users {
        let new_user = generate_user(rng, now);
        let user = match repo.create_user(&new_user).await {
            Ok(user) => user,
            Err(DataError::Conflict(_)) => {
                tracing::debug!(email = %new_user.email, "Seed email already taken, skipping");
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        summary.users += 1;

        for _ in 0..posts_per_user {
            repo.create_post(user.id, &generate_post_title(rng)).await?;
            summary.posts += 1;
        }
    }

    tracing::debug!(
        users = summary.users,
        posts = summary.posts,
        skipped = summary.skipped,
        "Seed finished"
    );
    Ok(summary)
}
