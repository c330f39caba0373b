pub mod case;
pub mod case_tag;
pub mod definition;
pub mod enums;
pub mod event;
pub mod project;
pub mod tag;
pub mod tag_type;
pub mod ticket;
