//! Live capture support for tcpgrep, built on the `pcap` crate.

use libtcpgrep::Error;

mod capture;

pub use capture::LiveCaptureSource;

/// Name of the default capture interface, as chosen by libpcap.
pub fn default_interface() -> Result<String, Error> {
    match pcap::Device::lookup() {
        Ok(Some(dev)) => Ok(dev.name),
        Ok(None) => Err(Error::CaptureUnavailable(
            "no capture interface found".to_owned(),
        )),
        Err(e) => Err(Error::CaptureUnavailable(e.to_string())),
    }
}
