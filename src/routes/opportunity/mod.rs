mod handler;

pub use handler::{
    create_opportunity, delete_opportunity, get_opportunity, list_opportunities,
    update_opportunity,
};
