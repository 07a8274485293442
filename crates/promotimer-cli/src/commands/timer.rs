//! Timer management commands against the local timer store.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use promotimer_core::storage::TimerStore;
use promotimer_core::{
    StyleConfig, Targeting, Timer, TimerKind, TimerStatus, Urgency, WidgetPosition, WidgetSize,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a timer
    Create {
        /// Shop domain the timer belongs to
        #[arg(long)]
        shop: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Timer kind: fixed | evergreen
        #[arg(long, value_parser = parse_kind)]
        kind: TimerKind,
        /// Absolute end (RFC 3339), required for fixed timers
        #[arg(long, value_parser = parse_datetime)]
        end_at: Option<DateTime<Utc>>,
        /// Absolute start (RFC 3339), optional for fixed timers
        #[arg(long, value_parser = parse_datetime)]
        start_at: Option<DateTime<Utc>>,
        /// Per-visitor duration in minutes, required for evergreen timers
        #[arg(long)]
        duration: Option<u32>,
        /// Description shown next to the countdown
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated product ids (product targeting)
        #[arg(long)]
        product_ids: Option<String>,
        /// Comma-separated collection ids (collection targeting)
        #[arg(long)]
        collection_ids: Option<String>,
        /// Widget background color
        #[arg(long, default_value = "#000000")]
        color: String,
        /// Widget size: small | medium | large
        #[arg(long, value_parser = parse_size, default_value = "medium")]
        size: WidgetSize,
        /// Widget position: top | bottom | static
        #[arg(long, value_parser = parse_position, default_value = "static")]
        position: WidgetPosition,
        /// Urgency effect: none | pulse
        #[arg(long, value_parser = parse_urgency, default_value = "none")]
        urgency: Urgency,
    },
    /// List timers for a shop
    List {
        #[arg(long)]
        shop: String,
    },
    /// Print one timer as JSON
    Show { id: String },
    /// Delete a timer
    Delete { id: String },
    /// Change a timer's lifecycle status: active | scheduled | expired
    SetStatus {
        id: String,
        #[arg(value_parser = parse_status)]
        status: TimerStatus,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TimerStore::open()?;
    match action {
        TimerAction::Create {
            shop,
            name,
            kind,
            end_at,
            start_at,
            duration,
            description,
            product_ids,
            collection_ids,
            color,
            size,
            position,
            urgency,
        } => {
            let targeting = build_targeting(product_ids.as_deref(), collection_ids.as_deref());
            let timer = Timer {
                id: uuid::Uuid::new_v4().to_string(),
                shop,
                name,
                description,
                kind,
                status: TimerStatus::Active,
                start_at,
                end_at,
                duration_minutes: duration,
                targeting,
                style_config: StyleConfig {
                    color,
                    size,
                    position,
                    urgency,
                },
                impressions: 0,
                created_at: Utc::now(),
            };
            store.insert(&timer)?;
            println!("{}", serde_json::to_string_pretty(&timer)?);
        }
        TimerAction::List { shop } => {
            let timers = store.list(&shop)?;
            println!("{}", serde_json::to_string_pretty(&timers)?);
        }
        TimerAction::Show { id } => match store.get(&id)? {
            Some(timer) => println!("{}", serde_json::to_string_pretty(&timer)?),
            None => eprintln!("no timer with id '{id}'"),
        },
        TimerAction::Delete { id } => {
            if store.delete(&id)? {
                println!("deleted {id}");
            } else {
                eprintln!("no timer with id '{id}'");
            }
        }
        TimerAction::SetStatus { id, status } => {
            store.set_status(&id, status)?;
            println!("updated {id}");
        }
    }
    Ok(())
}

fn build_targeting(product_ids: Option<&str>, collection_ids: Option<&str>) -> Targeting {
    if let Some(ids) = product_ids {
        return Targeting::Product {
            product_ids: parse_id_list(ids),
        };
    }
    if let Some(ids) = collection_ids {
        return Targeting::Collection {
            collection_ids: parse_id_list(ids),
        };
    }
    Targeting::All
}

pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_kind(raw: &str) -> Result<TimerKind, String> {
    match raw {
        "fixed" => Ok(TimerKind::Fixed),
        "evergreen" => Ok(TimerKind::Evergreen),
        other => Err(format!("unknown timer kind '{other}'")),
    }
}

fn parse_status(raw: &str) -> Result<TimerStatus, String> {
    match raw {
        "active" => Ok(TimerStatus::Active),
        "scheduled" => Ok(TimerStatus::Scheduled),
        "expired" => Ok(TimerStatus::Expired),
        other => Err(format!("unknown status '{other}'")),
    }
}

fn parse_size(raw: &str) -> Result<WidgetSize, String> {
    match raw {
        "small" => Ok(WidgetSize::Small),
        "medium" => Ok(WidgetSize::Medium),
        "large" => Ok(WidgetSize::Large),
        other => Err(format!("unknown size '{other}'")),
    }
}

fn parse_position(raw: &str) -> Result<WidgetPosition, String> {
    match raw {
        "top" => Ok(WidgetPosition::Top),
        "bottom" => Ok(WidgetPosition::Bottom),
        "static" => Ok(WidgetPosition::Static),
        other => Err(format!("unknown position '{other}'")),
    }
}

fn parse_urgency(raw: &str) -> Result<Urgency, String> {
    match raw {
        "none" => Ok(Urgency::None),
        "pulse" => Ok(Urgency::Pulse),
        other => Err(format!("unknown urgency '{other}'")),
    }
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{raw}': {e}"))
}
