//! Serial line output over a blocking UART transmitter

use embassy_rp::uart::{Blocking, Error, UartTx};
use sweepscan_core::traits::LineSink;

/// Line terminator appended to every line
const LINE_END: &[u8] = b"\r\n";

/// Writes each line to the UART followed by CRLF
pub struct UartLineSink {
    tx: UartTx<'static, Blocking>,
}

impl UartLineSink {
    pub fn new(tx: UartTx<'static, Blocking>) -> Self {
        Self { tx }
    }
}

impl LineSink for UartLineSink {
    type Error = Error;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.tx.blocking_write(line.as_bytes())?;
        self.tx.blocking_write(LINE_END)
    }
}
