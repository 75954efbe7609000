//! Static demo dataset served while the store is unreachable.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Artwork, ArtworkCategory, DEFAULT_ARTIST_NAME, Role, User};

const DEMO_IMAGE: &str =
    "https://images.unsplash.com/photo-1579783902614-a3fb3927b6a5?auto=format&fit=crop&w=800";

/// 2024-06-01T00:00:00Z; demo records are spaced one day apart from here.
const DEMO_EPOCH: i64 = 1_717_200_000;

fn demo_timestamp(day: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(DEMO_EPOCH + day * 86_400, 0).unwrap_or_default()
}

pub fn demo_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn artwork(
    n: u128,
    title: &str,
    description: &str,
    category: ArtworkCategory,
    featured: bool,
    views: i64,
) -> Artwork {
    Artwork {
        id: demo_id(n),
        title: title.to_string(),
        description: description.to_string(),
        artist_name: DEFAULT_ARTIST_NAME.to_string(),
        image_url: DEMO_IMAGE.to_string(),
        category,
        tags: Vec::new(),
        dimensions: None,
        year_created: None,
        featured,
        views,
        created_at: demo_timestamp(i64::try_from(n).unwrap_or_default()),
    }
}

static MOCK_ARTWORKS: LazyLock<Vec<Artwork>> = LazyLock::new(|| {
    vec![
        artwork(
            1,
            "Starlight Symphony",
            "A breathtaking abstract piece capturing the essence of night sky",
            ArtworkCategory::Abstract,
            true,
            234,
        ),
        artwork(
            2,
            "Ocean Whispers",
            "Serene coastal landscape with dynamic ocean waves",
            ArtworkCategory::Landscape,
            true,
            156,
        ),
        artwork(
            3,
            "Urban Dreams",
            "Modern cityscape with vibrant colors and architectural elements",
            ArtworkCategory::Digital,
            false,
            123,
        ),
        artwork(
            4,
            "Forest Serenity",
            "Peaceful woodland scene with natural light streaming through trees",
            ArtworkCategory::Photography,
            true,
            198,
        ),
        artwork(
            5,
            "Colors of Emotion",
            "Expressive abstract work exploring human emotions through color",
            ArtworkCategory::Abstract,
            false,
            145,
        ),
        artwork(
            6,
            "Golden Hour",
            "Beautiful portrait capturing the magic of golden hour lighting",
            ArtworkCategory::Portrait,
            true,
            267,
        ),
    ]
});

pub fn mock_artworks() -> &'static [Artwork] {
    &MOCK_ARTWORKS
}

/// A fixed login that works only in demo mode.
pub struct DemoAccount {
    pub user: User,
    pub password: &'static str,
}

static DEMO_ACCOUNTS: LazyLock<Vec<DemoAccount>> = LazyLock::new(|| {
    vec![
        DemoAccount {
            user: User {
                id: demo_id(1),
                name: "Demo User".to_string(),
                email: "demo@example.com".to_string(),
                role: Role::User,
                bio: None,
                created_at: demo_timestamp(0),
            },
            password: "demo123",
        },
        DemoAccount {
            user: User {
                id: demo_id(2),
                name: "Admin User".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
                bio: None,
                created_at: demo_timestamp(0),
            },
            password: "admin123",
        },
    ]
});

pub fn demo_accounts() -> &'static [DemoAccount] {
    &DEMO_ACCOUNTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mock_ids_are_unique() {
        let ids: HashSet<_> = mock_artworks().iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), mock_artworks().len());
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn two_abstract_pieces() {
        let count = mock_artworks()
            .iter()
            .filter(|a| a.category == ArtworkCategory::Abstract)
            .count();
        assert_eq!(count, 2);
    }
}
