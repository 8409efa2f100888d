use std::io::Write;

use crate::poller::SampleSink;
use crate::sms::{ReadError, SmsVector4};

/// Text stand-in for the acceleration readout window.
///
/// Holds the latest acceleration (zero until the first read) and the three
/// axis labels, and writes them out on every sample.
pub struct ConsoleDisplay<W: Write + Send + 'static> {
    out: W,
    acceleration: SmsVector4,
    labels: [String; 3],
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        let mut display = Self {
            out,
            acceleration: SmsVector4::ZERO,
            labels: Default::default(),
        };
        display.update_labels();
        display
    }

    pub fn acceleration(&self) -> SmsVector4 {
        self.acceleration
    }

    pub fn labels(&self) -> &[String; 3] {
        &self.labels
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn update_labels(&mut self) {
        let a = self.acceleration;
        self.labels = [
            format!("x: {}", a.x),
            format!("y: {}", a.y),
            format!("z: {}", a.z),
        ];
    }
}

impl<W: Write + Send + 'static> SampleSink for ConsoleDisplay<W> {
    fn on_sample(&mut self, sample: SmsVector4) {
        self.acceleration = sample;
        self.update_labels();
        let [x, y, z] = &self.labels;
        if let Err(e) = writeln!(self.out, "{}  {}  {}", x, y, z) {
            tracing::warn!("display write failed: {}", e);
        }
    }

    // The readout keeps showing the last good sample.
    fn on_error(&mut self, error: ReadError) {
        tracing::warn!("Read error: {}", error);
    }
}
