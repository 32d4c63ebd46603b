pub mod clear;
pub mod conflicts;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod series;
pub mod show;
