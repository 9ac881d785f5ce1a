pub mod announcements;
pub mod genres;
pub mod root;
