//! Diagnostic side channel.
//!
//! Encoders and decoders report named records (`zone`, `data`) at fixed
//! observation points. Records are only formatted when a sink is installed,
//! and a sink never influences coding results.

/// Receives diagnostic records.
pub trait TraceSink {
    fn trace(&mut self, zone: &str, data: &str);
}

impl<F> TraceSink for F
where
    F: FnMut(&str, &str),
{
    fn trace(&mut self, zone: &str, data: &str) {
        self(zone, data)
    }
}

/// Prints `zone:` followed by the record on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl TraceSink for StdoutSink {
    fn trace(&mut self, zone: &str, data: &str) {
        println!("{zone}:");
        println!("{data}");
    }
}

/// Forwards records to `tracing` at TRACE level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn trace(&mut self, zone: &str, data: &str) {
        tracing::trace!(target: "rlnc::trace", zone, "{data}");
    }
}

/// Optional sink plus zone prefix, owned by each encoder/decoder.
#[derive(Default)]
pub(crate) struct Tracer {
    sink: Option<Box<dyn TraceSink>>,
    prefix: String,
}

impl Tracer {
    pub(crate) fn new(enabled: bool) -> Self {
        let mut tracer = Self::default();
        if enabled {
            tracer.set_sink(Box::new(TracingSink));
        }
        tracer
    }

    pub(crate) fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    pub(crate) fn clear_sink(&mut self) {
        self.sink = None;
    }

    pub(crate) fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_owned();
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Builds the record with `data` only if a sink is listening.
    pub(crate) fn emit(&mut self, zone: &str, data: impl FnOnce() -> String) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let text = data();
        if self.prefix.is_empty() {
            sink.trace(zone, &text);
        } else {
            sink.trace(&format!("{}.{}", self.prefix, zone), &text);
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Space-separated coefficient list, the format used by the coefficient zones.
pub(crate) fn format_coefficients(coefficients: &[u8]) -> String {
    coefficients
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_emit_is_lazy_without_sink() {
        let mut tracer = Tracer::new(false);
        let mut built = false;
        tracer.emit("zone", || {
            built = true;
            String::new()
        });
        assert!(!built);
    }

    #[test]
    fn test_prefix_and_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut tracer = Tracer::new(false);
        tracer.set_sink(Box::new(move |zone: &str, data: &str| {
            sink_seen.borrow_mut().push(format!("{zone}={data}"));
        }));
        tracer.emit("a", || "1".into());
        tracer.set_prefix("decoder");
        tracer.emit("b", || "2".into());
        tracer.clear_sink();
        tracer.emit("c", || "3".into());
        assert_eq!(*seen.borrow(), vec!["a=1".to_string(), "decoder.b=2".to_string()]);
    }

    #[test]
    fn test_format_coefficients() {
        assert_eq!(format_coefficients(&[1, 0, 255]), "1 0 255");
    }
}
