#[macro_use]
extern crate log;

mod config;
mod decode;
mod dispatch;
mod duration;
mod error;
mod five_tuple;
mod frame;
mod matcher;
mod sink;
mod source;
mod three_tuple;

pub use config::Config;
pub use decode::{decode_frame, DecodedFrame};
pub use dispatch::{DispatchStats, Dispatcher};
pub use duration::Duration;
pub use error::Error;
pub use five_tuple::FiveTuple;
pub use frame::RawFrame;
pub use matcher::PatternMatcher;
pub use sink::{Sink, TextSink};
pub use source::{FrameSource, PcapFileSource};
pub use three_tuple::ThreeTuple;

pub use pcap_parser;

#[cfg(test)]
pub(crate) mod testutil;
