pub mod like;
pub mod photo;
