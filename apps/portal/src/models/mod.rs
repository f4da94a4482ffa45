pub mod application;
pub mod job;
pub mod notification;
pub mod profile;
pub mod skill;

pub use application::{Application, ApplicationStatus, ApplyRequest};
pub use job::Job;
pub use notification::Notification;
pub use profile::{UserIdentity, UserProfile};
pub use skill::UserSkillProfile;
