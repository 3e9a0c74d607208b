//! Plan catalog model.

use serde::Serialize;

/// A named pricing tier from the `plans` table.
///
/// `monthly_credits = 0` means unlimited/custom - the billing engine
/// treats such plans as never nearing or exceeding quota.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub monthly_credits: i64,

    /// `active` plans are listed publicly; `hidden` plans are
    /// grandfathered tiers still referenced by existing projects
    pub status: String,
}
