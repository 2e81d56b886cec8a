use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use libtcpgrep::pcap_parser::Linktype;
use libtcpgrep::{Config, Duration, Error, FrameSource, RawFrame};
use pcap::{Active, Capture, Precision};
use tracing::{debug, trace, warn};

/// Live frame source over one network interface.
///
/// The capture handle is opened in non-blocking mode and polled with
/// a configurable sleep, so a cleared `running` flag is observed
/// promptly even while the interface is silent. The handle (and the
/// interface's capture mode) is released when the source is dropped.
pub struct LiveCaptureSource {
    name: String,
    cap: Capture<Active>,
    link_type: Linktype,
    precision: Precision,
    sleep_interval: u64,
    running: Arc<AtomicBool>,
    buf: Vec<u8>,
    index: usize,
}

impl LiveCaptureSource {
    /// Open `interface_name` for live capture.
    ///
    /// `bpf_filter` is an optional capture filter compiled by libpcap;
    /// the payload pattern itself is matched later, in the dispatch
    /// loop. All failures here are `CaptureUnavailable`: nothing was
    /// captured yet and the caller is expected to give up.
    pub fn open(
        interface_name: &str,
        bpf_filter: Option<&str>,
        config: &Config,
        running: Arc<AtomicBool>,
    ) -> Result<Self, Error> {
        let interfaces = pcap::Device::list().map_err(|e| {
            Error::CaptureUnavailable(format!(
                "could not list network interfaces: {e} (are you running with CAP_NET_RAW?)"
            ))
        })?;
        let dev = interfaces
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| {
                Error::CaptureUnavailable(format!("no such interface: {interface_name}"))
            })?;

        let immediate = config.get_bool("live.immediate").unwrap_or(true);
        let promisc = config.get_bool("live.promisc").unwrap_or(true);
        let snaplen = config.get_usize("live.snaplen").unwrap_or(65535) as i32;
        let sleep_interval = config.get_usize("live.sleep").unwrap_or(500) as u64;
        let precision = match config.get("live.precision") {
            None | Some("micro") => Precision::Micro,
            Some("nano") => Precision::Nano,
            Some(other) => {
                return Err(Error::CaptureUnavailable(format!(
                    "invalid live.precision value: {other}"
                )))
            }
        };

        let cap = Capture::from_device(dev)
            .map_err(|e| Error::CaptureUnavailable(e.to_string()))?
            .immediate_mode(immediate)
            .promisc(promisc)
            .snaplen(snaplen)
            .precision(precision);
        let mut cap = cap
            .open()
            .map_err(|e| Error::CaptureUnavailable(e.to_string()))?
            .setnonblock()
            .map_err(|e| Error::CaptureUnavailable(e.to_string()))?;
        if let Some(expr) = bpf_filter {
            cap.filter(expr, true).map_err(|e| {
                Error::CaptureUnavailable(format!("invalid capture filter {expr:?}: {e}"))
            })?;
        }

        // convert from `pcap` crate format to `pcap_parser` format
        let link_type = Linktype(cap.get_datalink().0);
        debug!("capture open on {interface_name}, link type {link_type:?}");

        Ok(LiveCaptureSource {
            name: interface_name.to_owned(),
            cap,
            link_type,
            precision,
            sleep_interval,
            running,
            buf: Vec::new(),
            index: 0,
        })
    }

    pub fn interface(&self) -> &str {
        &self.name
    }
}

impl FrameSource for LiveCaptureSource {
    fn next_frame(&mut self) -> Result<RawFrame<'_>, Error> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                debug!("stop requested, closing capture");
                return Err(Error::CaptureClosed);
            }
            match self.cap.next_packet() {
                Ok(packet) => {
                    let header = *packet.header;
                    self.buf.clear();
                    self.buf.extend_from_slice(packet.data);
                    let ts_sec = header.ts.tv_sec as u32;
                    let ts_frac = header.ts.tv_usec as u32;
                    let ts = if self.precision == Precision::Micro {
                        Duration::new(ts_sec, ts_frac)
                    } else {
                        Duration::new(ts_sec, ts_frac / 1000)
                    };
                    self.index += 1;
                    trace!("live frame #{} ({} bytes)", self.index, header.caplen);
                    return Ok(RawFrame {
                        interface: &self.name,
                        ts,
                        link_type: self.link_type,
                        data: &self.buf,
                        caplen: header.caplen,
                        origlen: header.len,
                        index: self.index,
                    });
                }
                Err(pcap::Error::TimeoutExpired) => {
                    thread::sleep(StdDuration::from_micros(self.sleep_interval));
                }
                Err(pcap::Error::NoMorePackets) => return Err(Error::CaptureClosed),
                Err(e) => {
                    warn!("capture fault on {}: {e}", self.name);
                    return Err(Error::CaptureError(e.to_string()));
                }
            }
        }
    }
}
