mod model;
mod resolver;
mod validity;

pub use model::{
    StyleConfig, Targeting, Timer, TimerKind, TimerPayload, TimerResponse, TimerStatus, Urgency,
    WidgetPosition, WidgetSize,
};
pub use resolver::{priority, select_best_timer, VisitorContext};
pub use validity::{is_eligible, starts_in_future};
