mod club;
mod document;
mod event;
mod message;
mod opportunity;
pub mod user;

pub use club::{Club, ClubPatch};
pub use document::{Document, Resource};
pub use event::{Event, EventPatch};
pub use message::{Message, MessagePayload, NewMessage};
pub use opportunity::{Opportunity, OpportunityPatch, OpportunityType, OpportunityView};
pub use user::{NewUser, ProfileUpdate, Role, User, UserSummary, normalize_email, normalize_full_name};
