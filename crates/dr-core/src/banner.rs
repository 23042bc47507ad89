//! Welcome text sent once at startup, before the transfer engine is enabled.

use crate::drain::OutputSink;

pub const DELIMITER: &str = "************************************************\r\n";
pub const APP_NAME: &str = " DMA Ring buffer example\r\n";
pub const APP_HELP1: &str = "This example receives data from UART-RX.\r\n\
Data is routed through a DMA ring buffer read by CPU.\r\n\
Finally the data is sent as echo to UART-TX.\r\n";
pub const APP_HELP2: &str = "Just start typing. What you type will be echoed below:\r\n";

/// Banner strings in transmit order.
pub const BANNER: [&str; 5] = [DELIMITER, APP_NAME, DELIMITER, APP_HELP1, APP_HELP2];

/// Forward the banner, one span per string. Returns the bytes sent.
pub fn emit_banner<S: OutputSink + ?Sized>(sink: &mut S) -> usize {
    BANNER
        .iter()
        .map(|line| {
            sink.forward(line.as_bytes());
            line.len()
        })
        .sum()
}
