//! Product review types.

use chrono::{DateTime, Utc};

use papeleria_core::{ProductId, ReviewId, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// 1 to 5.
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: i32,
    pub comment: Option<String>,
}

/// A review with its author's display name, for the product page.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    pub author_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewWithAuthor {
    /// Filled and empty stars, e.g. "★★★☆☆".
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::try_from(self.rating.clamp(0, 5)).unwrap_or(0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        let review = ReviewWithAuthor {
            author_name: "Ana".to_owned(),
            rating: 3,
            comment: None,
            reviewed_at: Utc::now(),
        };
        assert_eq!(review.stars(), "★★★☆☆");
    }
}
