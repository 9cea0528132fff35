use serde::{Deserialize, Serialize};

/// A single recipe from the bundled dataset.
///
/// Every field except `id` is presentation data; all fields take their
/// default when missing from the source JSON, so a structurally incomplete
/// entry loads as a recipe with empty/absent fields rather than failing.
/// Records are constructed once at load time and immutable thereafter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recipe {
    /// Unique identifier (slug), acts as the primary key.
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Total preparation time in minutes; absent when the source didn't list one.
    pub total_minutes: Option<u32>,
    pub servings: Option<String>,
    pub updated_at: Option<String>,
    /// Category labels, cleaned of site-navigation junk at load time.
    pub categories: Vec<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub source_url: String,
}
