pub mod config;
pub mod demo_feed;
pub mod error;
pub mod feed;
pub mod fixture;
pub mod insight;
pub mod interval;
pub mod policy;
pub mod state;
pub mod status;
pub mod tick;
pub mod tips;
pub mod timing;
pub mod view;

pub use error::StatusError;
pub use fixture::Fixture;
pub use policy::DurationPolicy;
pub use status::{MatchState, MatchStatus, StatusDetail, compute_status, evaluate_fixture};
