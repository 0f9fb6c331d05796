//! Distance metric implementations.

mod channel;
mod perceptual;

pub use channel::{ChannelDistance, MAX_CHANNEL_DISTANCE};
pub use perceptual::PerceptualDistance;
