pub mod fixture_repository;
pub mod user_repository;

pub use fixture_repository::FixtureRepository;
pub use user_repository::{PickOp, UserRepository};
