use std::fmt;
use std::net::IpAddr;

use crate::three_tuple::ThreeTuple;

/// Network 5-tuple: layer 4 protocol, addresses and ports
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FiveTuple {
    pub proto: u8,
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FiveTuple {
    pub fn from_three_tuple(t3: &ThreeTuple, src_port: u16, dst_port: u16) -> Self {
        FiveTuple {
            proto: t3.proto,
            src: t3.src,
            dst: t3.dst,
            src_port,
            dst_port,
        }
    }
}

impl fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} [{}]",
            self.src, self.src_port, self.dst, self.dst_port, self.proto
        )
    }
}
