pub mod category;
pub mod excerpt;
pub mod extract;
pub mod fuzzy;
pub mod patterns;
pub mod sentiment;
