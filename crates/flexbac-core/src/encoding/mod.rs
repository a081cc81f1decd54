/// Encoders and decoders for primitive values and tagged fields.
pub mod primitives;
/// Zero-copy cursor over a received frame.
pub mod reader;
/// Application, context, opening and closing tags.
pub mod tag;
/// Growable output buffer for outgoing frames.
pub mod writer;
