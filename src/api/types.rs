use serde::{Deserialize, Serialize};

/// Raw swipe state from the hand tracker: 0 = none, 1 = right, 2 = left
#[derive(Debug, Clone, Deserialize)]
pub struct FingerTrack {
    pub swipe: u8,
    #[serde(default)]
    pub direction: String,
}

/// A swipe decision on the current recommendation card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swipe {
    Like,
    Dislike,
}

impl Swipe {
    pub fn label(self) -> &'static str {
        match self {
            Swipe::Like => "like",
            Swipe::Dislike => "dislike",
        }
    }
}

impl FingerTrack {
    /// Right swipes are likes, left swipes are dislikes
    pub fn swipe(&self) -> Option<Swipe> {
        match (self.swipe, self.direction.as_str()) {
            (1, _) | (_, "right") => Some(Swipe::Like),
            (2, _) | (_, "left") => Some(Swipe::Dislike),
            _ => None,
        }
    }
}

/// Normalised hand position, both fractions in [0, 1]
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HandPosition {
    pub x_frac: f32,
    pub y_frac: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerStatus {
    pub running: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: String,
    pub age: Option<u32>,
    pub liked_items: Vec<String>,
    pub disliked_items: Vec<String>,
    pub travel_history: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub user: UserPreferences,
    pub destination: String,
    pub top_n: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Place,
    Activity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub features: serde_json::Value,
}

impl Recommendation {
    /// Suggested block length in minutes; places take longer than single activities
    pub fn suggested_minutes(&self) -> i32 {
        match self.kind {
            ItemKind::Place => 120,
            ItemKind::Activity => 60,
        }
    }

    /// `features.tags`, skipping anything that isn't a string
    pub fn tags(&self) -> Vec<&str> {
        self.features
            .get("tags")
            .and_then(|tags| tags.as_array())
            .map(|tags| tags.iter().filter_map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn energy_level(&self) -> Option<&str> {
        self.features.get("energy_level").and_then(|e| e.as_str())
    }

    /// Whether this is an activity hosted at `place`
    pub fn belongs_to(&self, place: &Recommendation) -> bool {
        self.kind == ItemKind::Activity
            && place.kind == ItemKind::Place
            && self.place_id.as_deref() == Some(place.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeAction {
    pub user_id: String,
    pub item_id: String,
    pub action: Swipe,
    pub destination: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeResponse {
    pub success: bool,
}

/// Body for both the confidence check and the high-confidence item list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceCheckRequest {
    pub user_id: String,
    pub destination: String,
}

/// How decided the user's swipes are for one destination
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfidenceReport {
    pub likes: u32,
    pub dislikes: u32,
    pub total: u32,
    pub confidence_ratio: f64,
    /// Enough likes at a high enough ratio to build a schedule from
    pub meets_threshold: bool,
}

/// Liked items first, then unseen recommendations the service scores highly
#[derive(Debug, Clone, Deserialize)]
pub struct HighConfidenceResponse {
    pub items: Vec<Recommendation>,
}
