use bytes::{Buf, Bytes};

/// Represents an item in an outgoing chunked payload stream.
///
/// Each `Chunk` becomes one length-prefixed chunk on the wire, `Eof` becomes
/// the terminating zero-length chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}
