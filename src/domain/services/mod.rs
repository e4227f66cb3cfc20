pub mod conflict;
pub mod expansion;
pub mod messages;
pub mod normalize;
pub mod scheduler;
