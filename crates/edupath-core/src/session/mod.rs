//! Session domain module.
//!
//! The client's belief about the current user: models, identity change
//! events, the auth gateway seam, and local persistence seams.

pub mod cache;
pub mod event;
pub mod gateway;
pub mod model;
pub mod navigator;
pub mod normalize;

pub use cache::{ReturnPathStore, SessionSnapshotCache};
pub use event::{Identity, IdentitySnapshot};
pub use gateway::{AuthGateway, Credentials, LoginOutcome, RegisterOutcome, Registration};
pub use model::{Session, SessionUser};
pub use navigator::Navigator;
pub use normalize::normalize_user_payload;
