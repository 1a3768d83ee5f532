pub(crate) mod positions_errors;
pub(crate) mod positions_model;
pub(crate) mod positions_repository;
pub(crate) mod positions_service;
pub(crate) mod positions_traits;

pub use positions_errors::PositionError;
pub use positions_model::{Position, PositionDb, RecordedTransaction};
pub use positions_repository::PositionRepository;
pub use positions_service::PositionService;
pub use positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
