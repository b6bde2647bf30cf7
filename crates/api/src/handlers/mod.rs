pub mod posters;
pub mod stream;
