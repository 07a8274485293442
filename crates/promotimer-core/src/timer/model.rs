//! Timer value types and the storefront wire contract.
//!
//! The resolver is defined over these plain immutable values only -- no live
//! database handle ever reaches the resolution logic. Wire field names are
//! camelCase to match the storefront payload (`startAt`, `durationMinutes`,
//! `styleConfig`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Absolute shared end time for all visitors.
    Fixed,
    /// Rolling per-visitor duration, anchored at first encounter.
    Evergreen,
}

/// Coarse lifecycle flag set by the admin side. Only `Active` is eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Active,
    Scheduled,
    Expired,
}

/// Which storefront contexts a timer may appear on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Targeting {
    All,
    Product {
        #[serde(rename = "productIds", default)]
        product_ids: Vec<String>,
    },
    Collection {
        #[serde(rename = "collectionIds", default)]
        collection_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetPosition {
    Top,
    Bottom,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    None,
    Pulse,
}

/// Opaque display configuration, passed through to the storefront untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_size")]
    pub size: WidgetSize,
    #[serde(default = "default_position")]
    pub position: WidgetPosition,
    #[serde(default = "default_urgency")]
    pub urgency: Urgency,
}

fn default_color() -> String {
    "#000000".to_string()
}
fn default_size() -> WidgetSize {
    WidgetSize::Medium
}
fn default_position() -> WidgetPosition {
    WidgetPosition::Static
}
fn default_urgency() -> Urgency {
    Urgency::None
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            size: default_size(),
            position: default_position(),
            urgency: default_urgency(),
        }
    }
}

/// A configured promotional timer. Read-only input to the resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub shop: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TimerKind,
    pub status: TimerStatus,
    /// Meaningful only when `kind == Fixed`.
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    /// Meaningful only when `kind == Fixed`.
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    /// Meaningful only when `kind == Evergreen`.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub targeting: Targeting,
    #[serde(default)]
    pub style_config: StyleConfig,
    #[serde(default)]
    pub impressions: u64,
    pub created_at: DateTime<Utc>,
}

impl Timer {
    /// Validate a timer record before it is accepted into the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.shop.trim().is_empty() {
            return Err(ValidationError::MissingField("shop"));
        }
        match self.kind {
            TimerKind::Fixed => {
                let end = self.end_at.ok_or(ValidationError::MissingField("endAt"))?;
                if let Some(start) = self.start_at {
                    if start >= end {
                        return Err(ValidationError::InvalidTimeRange { start, end });
                    }
                }
            }
            TimerKind::Evergreen => match self.duration_minutes {
                None => return Err(ValidationError::MissingField("durationMinutes")),
                Some(0) => {
                    return Err(ValidationError::InvalidValue {
                        field: "durationMinutes".to_string(),
                        message: "must be a positive number of minutes".to_string(),
                    })
                }
                Some(_) => {}
            },
        }
        Ok(())
    }
}

/// Normalized storefront payload: display-relevant fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TimerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub targeting: Targeting,
    pub style_config: StyleConfig,
}

impl From<&Timer> for TimerPayload {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id.clone(),
            name: timer.name.clone(),
            description: timer.description.clone(),
            kind: timer.kind,
            start_at: timer.start_at,
            end_at: timer.end_at,
            duration_minutes: timer.duration_minutes,
            targeting: timer.targeting.clone(),
            style_config: timer.style_config.clone(),
        }
    }
}

/// Delivery endpoint response envelope. `timer: null` means "nothing to
/// show" and is a normal outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub timer: Option<TimerPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_timer(kind: TimerKind) -> Timer {
        Timer {
            id: "t1".to_string(),
            shop: "demo.myshopify.com".to_string(),
            name: "Flash Sale".to_string(),
            description: None,
            kind,
            status: TimerStatus::Active,
            start_at: None,
            end_at: None,
            duration_minutes: None,
            targeting: Targeting::All,
            style_config: StyleConfig::default(),
            impressions: 0,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn fixed_requires_end_at() {
        let timer = base_timer(TimerKind::Fixed);
        assert!(matches!(
            timer.validate(),
            Err(ValidationError::MissingField("endAt"))
        ));
    }

    #[test]
    fn fixed_rejects_inverted_window() {
        let mut timer = base_timer(TimerKind::Fixed);
        timer.start_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        timer.end_at = Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            timer.validate(),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn evergreen_requires_positive_duration() {
        let mut timer = base_timer(TimerKind::Evergreen);
        assert!(timer.validate().is_err());
        timer.duration_minutes = Some(0);
        assert!(timer.validate().is_err());
        timer.duration_minutes = Some(120);
        assert!(timer.validate().is_ok());
    }

    #[test]
    fn name_is_required() {
        let mut timer = base_timer(TimerKind::Evergreen);
        timer.duration_minutes = Some(60);
        timer.name = "  ".to_string();
        assert!(matches!(
            timer.validate(),
            Err(ValidationError::MissingField("name"))
        ));
    }

    #[test]
    fn targeting_wire_format() {
        let targeting = Targeting::Product {
            product_ids: vec!["gid://shopify/Product/1".to_string()],
        };
        let json = serde_json::to_value(&targeting).unwrap();
        assert_eq!(json["type"], "product");
        assert_eq!(json["productIds"][0], "gid://shopify/Product/1");
    }

    #[test]
    fn payload_omits_absent_window_fields() {
        let mut timer = base_timer(TimerKind::Evergreen);
        timer.duration_minutes = Some(30);
        let payload = TimerPayload::from(&timer);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("startAt").is_none());
        assert!(json.get("endAt").is_none());
        assert_eq!(json["durationMinutes"], 30);
        assert_eq!(json["type"], "evergreen");
        assert_eq!(json["styleConfig"]["urgency"], "none");
    }
}
