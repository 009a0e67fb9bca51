//! Pure salary arithmetic: how much of today's wage is earned and when the next payday is.

pub mod earnings;
pub mod payday;
