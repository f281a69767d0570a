mod banking;
mod education;
mod gamification;
mod insights;
mod investing;
mod savings;
mod social;
mod user;

pub use banking::*;
pub use education::*;
pub use gamification::*;
pub use insights::*;
pub use investing::*;
pub use savings::*;
pub use social::*;
pub use user::*;
