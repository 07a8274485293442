mod engine;

pub use engine::{format_digits, CountdownEngine, CountdownState, EXPIRED_DIGITS};
