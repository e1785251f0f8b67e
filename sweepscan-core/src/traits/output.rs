//! Line-oriented output

/// Destination for the text sample stream
///
/// Implementations append their own line terminator.
pub trait LineSink {
    /// Error type for write operations
    type Error;

    /// Write one line of text
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}
