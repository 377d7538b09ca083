pub mod catalog;
pub mod cycle_length;
pub mod events;
pub mod places;
pub mod symptoms;
pub mod treatments;
