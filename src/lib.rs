//! Nano Banana text-to-image and image-to-image nodes.
//!
//! Each node turns its form inputs into one API request, sends it through an
//! [`ImageGenerator`](ports::ImageGenerator), and decodes the answer into a
//! [`HostImage`](tensor::HostImage). Ports are swappable, so the same nodes
//! run live, recording, or replaying from a cassette.

pub mod adapters;
pub mod cassette;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod nodes;
pub mod output;
pub mod params;
pub mod ports;
pub mod response;
pub mod tensor;
