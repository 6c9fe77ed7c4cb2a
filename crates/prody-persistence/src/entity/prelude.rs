pub use super::activity_logs::Entity as ActivityLogs;
pub use super::meeting_participants::Entity as MeetingParticipants;
pub use super::meetings::Entity as Meetings;
pub use super::notifications::Entity as Notifications;
pub use super::organizations::Entity as Organizations;
pub use super::tasks::Entity as Tasks;
pub use super::users::Entity as Users;
