pub mod notification;
pub mod outcome;
pub mod project;
pub mod subject;

pub use notification::{Entity as Notification, Model as NotificationModel};
pub use outcome::{Entity as Outcome, Model as OutcomeModel};
pub use project::{Entity as Project, Model as ProjectModel};
pub use subject::{Entity as Subject, Model as SubjectModel};
