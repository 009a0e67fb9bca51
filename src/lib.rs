//! Terminal salary tracker. Shows what the current workday has earned so far, counts down to the
//! next payday and rest day, and keeps a small attendance log of clock-ins and clock-outs.
//!

pub mod cli;
pub mod fs;
pub mod salary;
pub mod storage;
pub mod tracker;
pub mod utils;
