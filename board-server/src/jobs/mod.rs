mod promotion;
pub mod session_sweep;

pub use promotion::PromotionJob;
