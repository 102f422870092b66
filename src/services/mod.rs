pub mod assessment;
pub mod outcome;
pub mod project;
pub mod subject;
