pub mod ai;
pub mod captains;
pub mod pick;
pub mod schedule;
pub mod state;
pub mod team;
