use crate::DEFAULT_BAUD_RATE;

/// Construction parameters for a [`SerialChannel`](crate::SerialChannel).
///
/// Ring sizes are const generics on the channel type, so the only runtime
/// parameter is the baud rate. It is recorded and logged but the channel
/// does not pace anything by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub baud_rate: u32,
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}
