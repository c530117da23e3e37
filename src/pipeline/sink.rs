use log::{debug, info};

/// Destination of the session messages. visible messages are meant
/// for the operator, the others for the background log.
pub trait MessageSink: Send + Sync {
    fn message(&self, msg: &str, visible: bool);
}

/// [MessageSink] forwarding to the [log] facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink {}

impl MessageSink for LogSink {
    fn message(&self, msg: &str, visible: bool) {
        if visible {
            info!("{}", msg);
        } else {
            debug!("{}", msg);
        }
    }
}
