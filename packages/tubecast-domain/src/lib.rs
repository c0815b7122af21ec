pub mod catalog;
pub mod ranking;
pub mod readability;
pub mod time_serde;
pub mod word_stats;

mod video;

pub use catalog::{ChannelInfo, ChannelProfile, VideoDetails};
pub use video::{SearchUpdate, VideoSummary};
