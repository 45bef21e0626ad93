pub mod calendar;
pub mod domain;
pub mod row;
pub mod table;
