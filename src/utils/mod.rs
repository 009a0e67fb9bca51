pub mod clock;
pub mod dir;
pub mod logging;
pub mod money;
pub mod percentage;
pub mod runtime;
pub mod time;
