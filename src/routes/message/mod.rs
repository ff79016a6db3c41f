mod handler;
mod model;

pub use handler::{
    get_chat_partners, get_contacts, get_messages, get_unread_counts, mark_messages_as_read,
    send_message,
};
pub use model::{MarkReadResponse, UnreadCounts, deliver_message};
