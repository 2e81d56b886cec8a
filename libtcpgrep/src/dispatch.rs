use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decode::decode_frame;
use crate::error::Error;
use crate::matcher::PatternMatcher;
use crate::sink::Sink;
use crate::source::FrameSource;

/// Counters kept by the dispatch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames pulled from the source
    pub frames: usize,
    /// Frames whose payload matched the pattern
    pub matched: usize,
    /// Transient capture faults that were skipped
    pub capture_errors: usize,
}

/// Single-threaded capture loop: pull a frame, decode it, test it,
/// emit it on match.
///
/// Each frame is fully processed before the next one is pulled, so
/// the sink receives matches strictly in arrival order.
pub struct Dispatcher<S: Sink> {
    matcher: PatternMatcher,
    sink: S,
    stats: DispatchStats,
}

impl<S: Sink> Dispatcher<S> {
    pub fn new(matcher: PatternMatcher, sink: S) -> Self {
        Dispatcher {
            matcher,
            sink,
            stats: DispatchStats::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Run until the source closes or `running` is cleared.
    ///
    /// Capture is inherently lossy, so a `CaptureError` on one frame
    /// is logged and the loop moves on, there is no retry of a lost
    /// frame. `CaptureClosed` ends the loop cleanly. The `running`
    /// flag is checked between iterations, never mid-decode.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        running: Arc<AtomicBool>,
    ) -> Result<(), Error> {
        debug!("dispatch loop starting");
        while running.load(Ordering::SeqCst) {
            match source.next_frame() {
                Ok(raw) => {
                    self.stats.frames += 1;
                    trace!("frame #{} ({} bytes)", raw.index, raw.data.len());
                    let frame = decode_frame(&raw);
                    if self.matcher.matches(&frame) {
                        self.stats.matched += 1;
                        self.sink.emit(&frame);
                    }
                }
                Err(Error::CaptureClosed) => {
                    debug!("capture closed, stopping dispatch");
                    break;
                }
                Err(Error::CaptureError(e)) => {
                    self.stats.capture_errors += 1;
                    warn!("capture error (frame skipped): {e}");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(
            "dispatch done: {} frames, {} matched, {} capture errors",
            self.stats.frames, self.stats.matched, self.stats.capture_errors
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use pcap_parser::Linktype;

    use super::{DispatchStats, Dispatcher};
    use crate::decode::DecodedFrame;
    use crate::duration::Duration;
    use crate::error::Error;
    use crate::frame::RawFrame;
    use crate::matcher::PatternMatcher;
    use crate::sink::Sink;
    use crate::source::FrameSource;
    use crate::testutil::{arp_frame, ether_ipv4_tcp_frame};

    enum TestEvent {
        Frame(Vec<u8>),
        Fault,
    }

    struct TestSource {
        events: Vec<TestEvent>,
        pos: usize,
    }

    impl TestSource {
        fn new(events: Vec<TestEvent>) -> Self {
            TestSource { events, pos: 0 }
        }
    }

    impl FrameSource for TestSource {
        fn next_frame(&mut self) -> Result<RawFrame<'_>, Error> {
            let pos = self.pos;
            self.pos += 1;
            match self.events.get(pos) {
                Some(TestEvent::Frame(data)) => Ok(RawFrame {
                    interface: "test0",
                    ts: Duration::new(pos as u32, 0),
                    link_type: Linktype::ETHERNET,
                    data,
                    caplen: data.len() as u32,
                    origlen: data.len() as u32,
                    index: pos + 1,
                }),
                Some(TestEvent::Fault) => Err(Error::CaptureError("injected fault".to_owned())),
                None => Err(Error::CaptureClosed),
            }
        }
    }

    #[derive(Default)]
    struct CollectSink {
        payloads: Vec<String>,
    }

    impl Sink for CollectSink {
        fn emit(&mut self, frame: &DecodedFrame) {
            self.payloads
                .push(String::from_utf8_lossy(frame.payload).into_owned());
        }
    }

    fn run_dispatcher(events: Vec<TestEvent>, pattern: &str) -> Dispatcher<CollectSink> {
        let mut source = TestSource::new(events);
        let mut dispatcher = Dispatcher::new(PatternMatcher::new(pattern), CollectSink::default());
        let running = Arc::new(AtomicBool::new(true));
        dispatcher.run(&mut source, running).unwrap();
        dispatcher
    }

    #[test]
    fn dispatch_emits_matches_in_order() {
        let events = vec![
            TestEvent::Frame(ether_ipv4_tcp_frame(b"Mozilla/5.0 Safari/605 first")),
            TestEvent::Frame(ether_ipv4_tcp_frame(b"curl/8.0")),
            TestEvent::Frame(ether_ipv4_tcp_frame(b"SAFARI second")),
        ];
        let dispatcher = run_dispatcher(events, "safari");
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                frames: 3,
                matched: 2,
                capture_errors: 0
            }
        );
        let payloads = &dispatcher.sink().payloads;
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].contains("first"));
        assert!(payloads[1].contains("second"));
    }

    #[test]
    fn dispatch_skips_non_tcp_frames() {
        let events = vec![
            TestEvent::Frame(arp_frame()),
            TestEvent::Frame(ether_ipv4_tcp_frame(b"Safari here")),
        ];
        let dispatcher = run_dispatcher(events, "safari");
        assert_eq!(dispatcher.stats().frames, 2);
        assert_eq!(dispatcher.stats().matched, 1);
    }

    #[test]
    fn dispatch_continues_after_capture_error() {
        let events = vec![
            TestEvent::Frame(ether_ipv4_tcp_frame(b"Safari one")),
            TestEvent::Fault,
            TestEvent::Frame(ether_ipv4_tcp_frame(b"Safari two")),
        ];
        let dispatcher = run_dispatcher(events, "safari");
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                frames: 2,
                matched: 2,
                capture_errors: 1
            }
        );
    }

    #[test]
    fn dispatch_terminates_on_close() {
        let events = vec![
            TestEvent::Frame(ether_ipv4_tcp_frame(b"a")),
            TestEvent::Frame(ether_ipv4_tcp_frame(b"b")),
            TestEvent::Frame(ether_ipv4_tcp_frame(b"c")),
        ];
        let dispatcher = run_dispatcher(events, "nomatch");
        assert_eq!(dispatcher.stats().frames, 3);
        assert_eq!(dispatcher.stats().matched, 0);
    }

    #[test]
    fn dispatch_observes_cancellation() {
        let mut source = TestSource::new(vec![TestEvent::Frame(ether_ipv4_tcp_frame(b"x"))]);
        let mut dispatcher =
            Dispatcher::new(PatternMatcher::new("x"), CollectSink::default());
        let running = Arc::new(AtomicBool::new(true));
        running.store(false, Ordering::SeqCst);
        dispatcher.run(&mut source, running).unwrap();
        assert_eq!(dispatcher.stats().frames, 0);
    }
}
