pub mod notification;
pub mod outcome;
pub mod project;
pub mod subject;
