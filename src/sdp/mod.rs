pub mod addr_type;
pub mod attribute;
pub mod bandwidth;
pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod encryption_key;
pub mod media;
pub mod origin;
pub mod port_spec;
pub mod sdp_error;
pub mod session;
pub mod time_desc;

pub use attribute::{Attribute, AttributeList};
pub use decoder::{Decoder, decode_str};
pub use encoder::Encoder;
pub use media::{MediaDescription, MediaKind};
pub use sdp_error::{LineError, SdpError};
pub use session::Session;
