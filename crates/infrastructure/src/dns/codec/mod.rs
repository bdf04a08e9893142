pub mod message_codec;
pub mod record_type_map;

pub use message_codec::MessageCodec;
pub use record_type_map::RecordTypeMapper;
