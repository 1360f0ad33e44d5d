pub mod assignments;
pub mod beds;
pub mod catalog;
pub mod events;
pub mod pests;
pub mod plantings;
pub mod plants;
pub mod seasons;
