pub mod courses;
pub mod phoneme_api;
pub mod test_results;
