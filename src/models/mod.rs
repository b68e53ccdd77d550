pub mod assembly;
pub mod attendee;
pub mod minutes;
pub mod setting;
pub mod voting;
