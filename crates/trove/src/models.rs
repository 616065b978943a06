//! Domain records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trove_core::{Identity, Role};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal id.
    pub id: i64,
    /// Telegram user id.
    pub telegram_id: i64,
    /// First name as reported by Telegram.
    pub first_name: String,
    /// Last name, if shared.
    pub last_name: Option<String>,
    /// Telegram username, if any.
    pub username: Option<String>,
    /// Name shown to other users.
    pub generated_name: String,
    /// Access role.
    pub role: Role,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Last successful login.
    pub last_active: Option<DateTime<Utc>>,
}

impl User {
    /// The identity carried in this user's session token.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.telegram_id, self.generated_name.clone(), self.role)
    }

    /// JSON view with the derived `is_admin` flag.
    #[must_use]
    pub fn view(&self) -> UserView<'_> {
        UserView {
            user: self,
            is_admin: self.role == Role::Admin,
        }
    }
}

/// Serialized form of a [`User`].
#[derive(Debug, Serialize)]
pub struct UserView<'a> {
    #[serde(flatten)]
    user: &'a User,
    is_admin: bool,
}

/// Fields for a user created on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Telegram user id.
    pub telegram_id: i64,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Display name.
    pub generated_name: String,
    /// Initial role.
    pub role: Role,
}

/// A user-owned collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection id.
    pub id: i64,
    /// Owner.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Pinned collections sort first.
    pub is_pinned: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /collections`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCollection {
    /// Display name; must not be blank.
    pub name: String,
    /// Pin on creation.
    #[serde(default)]
    pub is_pinned: bool,
}

/// Body of `PUT /collections/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New pin state.
    #[serde(default)]
    pub is_pinned: Option<bool>,
}

/// Weights applied when a comparison is created with neither weight set.
pub const DEFAULT_PRICE_WEIGHT: i32 = 20;
/// See [`DEFAULT_PRICE_WEIGHT`].
pub const DEFAULT_PROS_CONS_WEIGHT: i32 = 80;

/// One product or option inside a comparison.
///
/// Items are owned by the client; the server stores them as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonItem {
    /// Client-side id.
    pub id: String,
    /// Source page.
    pub url: String,
    /// Product title.
    pub title: String,
    /// Free-form notes.
    pub description: String,
    /// Image URLs.
    pub images: Vec<String>,
    /// Price in `currency`.
    pub price: f64,
    /// Currency code.
    pub currency: String,
    /// Advantages.
    pub pros: Vec<ProCon>,
    /// Drawbacks.
    pub cons: Vec<ProCon>,
    /// Overall score.
    pub rating: f64,
    #[serde(rename = "priceRating")]
    /// Price component of the score.
    pub price_rating: f64,
    #[serde(rename = "prosConsRating")]
    /// Pros and cons component of the score.
    pub pros_cons_rating: f64,
    /// Date the client added the item.
    pub created_date: String,
}

/// A pro or con with its weight on the rating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProCon {
    /// What it is.
    pub text: String,
    /// How much it counts.
    pub impact: i32,
}

/// A user-owned comparison of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Comparison id.
    pub id: i64,
    /// Owner.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Items being compared, in client order.
    pub items: Vec<ComparisonItem>,
    /// Token for unauthenticated read access, if shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_link: Option<String>,
    /// Share of the rating driven by price.
    pub price_rating_weight: i32,
    /// Share of the rating driven by pros and cons.
    pub pros_cons_rating_weight: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Comparison {
    /// Hex SHA-256 over the name and items. Changes whenever either does,
    /// so viewers of a shared link can tell the content moved.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(b"|");
        hasher.update(serde_json::to_vec(&self.items).unwrap_or_default());
        hex::encode(hasher.finalize())
    }

    /// JSON view served through a public link.
    #[must_use]
    pub fn public_view(&self) -> PublicComparison<'_> {
        PublicComparison {
            comparison: self,
            hash: self.content_hash(),
        }
    }
}

/// Serialized form of a shared [`Comparison`], with its content hash.
#[derive(Debug, Serialize)]
pub struct PublicComparison<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    hash: String,
}

/// Body of `POST /comparisons`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewComparison {
    /// Display name; must not be blank.
    pub name: String,
    /// Items to compare.
    #[serde(default)]
    pub items: Vec<ComparisonItem>,
    /// Price weight.
    #[serde(default)]
    pub price_rating_weight: i32,
    /// Pros and cons weight.
    #[serde(default)]
    pub pros_cons_rating_weight: i32,
}

impl NewComparison {
    /// Fills in the default weights when neither was given.
    #[must_use]
    pub fn with_default_weights(mut self) -> Self {
        if self.price_rating_weight == 0 && self.pros_cons_rating_weight == 0 {
            self.price_rating_weight = DEFAULT_PRICE_WEIGHT;
            self.pros_cons_rating_weight = DEFAULT_PROS_CONS_WEIGHT;
        }
        self
    }
}

/// Body of `PUT /comparisons/:id`. Replaces everything except the public
/// link, which only the share endpoints change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonUpdate {
    /// New name; must not be blank.
    pub name: String,
    /// Items to compare.
    #[serde(default)]
    pub items: Vec<ComparisonItem>,
    /// Price weight.
    #[serde(default)]
    pub price_rating_weight: i32,
    /// Pros and cons weight.
    #[serde(default)]
    pub pros_cons_rating_weight: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: 3,
            telegram_id: 777,
            first_name: "Ada".to_string(),
            last_name: None,
            username: Some("ada".to_string()),
            generated_name: "Ada".to_string(),
            role,
            created_at: now,
            updated_at: now,
            last_active: None,
        }
    }

    #[test]
    fn test_identity_from_user() {
        let identity = user(Role::Architect).identity();
        assert_eq!(identity.user_id, 3);
        assert_eq!(identity.external_id, 777);
        assert_eq!(identity.display_name, "Ada");
        assert_eq!(identity.role, Role::Architect);
    }

    #[test]
    fn test_view_derives_admin_flag() {
        let json = serde_json::to_value(user(Role::Admin).view()).unwrap();
        assert_eq!(json["is_admin"], true);
        assert_eq!(json["role"], "admin");
        assert_eq!(json["telegram_id"], 777);

        let json = serde_json::to_value(user(Role::User).view()).unwrap();
        assert_eq!(json["is_admin"], false);
    }

    #[test]
    fn test_update_fields_are_optional() {
        let update: CollectionUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update, CollectionUpdate::default());

        let create: NewCollection = serde_json::from_str(r#"{"name":"Books"}"#).unwrap();
        assert!(!create.is_pinned);
    }

    fn comparison(name: &str) -> Comparison {
        let now = Utc::now();
        Comparison {
            id: 1,
            user_id: 3,
            name: name.to_string(),
            items: vec![ComparisonItem {
                id: "a".to_string(),
                title: "Kettle".to_string(),
                price: 25.0,
                pros: vec![ProCon {
                    text: "quiet".to_string(),
                    impact: 2,
                }],
                ..Default::default()
            }],
            public_link: None,
            price_rating_weight: DEFAULT_PRICE_WEIGHT,
            pros_cons_rating_weight: DEFAULT_PROS_CONS_WEIGHT,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_default_weights_only_when_both_unset() {
        let body: NewComparison = serde_json::from_str(r#"{"name":"Kettles"}"#).unwrap();
        let body = body.with_default_weights();
        assert_eq!(body.price_rating_weight, 20);
        assert_eq!(body.pros_cons_rating_weight, 80);

        let body: NewComparison =
            serde_json::from_str(r#"{"name":"Kettles","price_rating_weight":50}"#).unwrap();
        let body = body.with_default_weights();
        assert_eq!(body.price_rating_weight, 50);
        assert_eq!(body.pros_cons_rating_weight, 0);
    }

    #[test]
    fn test_item_field_names() {
        let item: ComparisonItem = serde_json::from_str(
            r#"{"title":"Kettle","priceRating":4.5,"prosConsRating":3,"created_date":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(item.title, "Kettle");
        assert!((item.price_rating - 4.5).abs() < f64::EPSILON);
        assert!(item.images.is_empty());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["prosConsRating"], 3.0);
        assert!(json.get("pros_cons_rating").is_none());
    }

    #[test]
    fn test_public_link_omitted_until_shared() {
        let mut shared = comparison("Kettles");
        assert!(serde_json::to_value(&shared).unwrap().get("public_link").is_none());

        shared.public_link = Some("abc".to_string());
        assert_eq!(serde_json::to_value(&shared).unwrap()["public_link"], "abc");
    }

    #[test]
    fn test_content_hash_tracks_name_and_items() {
        let base = comparison("Kettles");
        let hash = base.content_hash();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, comparison("Kettles").content_hash());

        assert_ne!(hash, comparison("Toasters").content_hash());

        let mut moved = comparison("Kettles");
        moved.items[0].price = 30.0;
        assert_ne!(hash, moved.content_hash());

        let json = serde_json::to_value(base.public_view()).unwrap();
        assert_eq!(json["hash"], hash);
        assert_eq!(json["name"], "Kettles");
    }
}
