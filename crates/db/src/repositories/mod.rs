pub mod session_repo;
pub mod slot_repo;
pub mod swap_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use slot_repo::SlotRepo;
pub use swap_repo::SwapRepo;
pub use user_repo::UserRepo;
