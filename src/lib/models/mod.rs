pub mod field;
pub mod parameters;
pub mod track;
