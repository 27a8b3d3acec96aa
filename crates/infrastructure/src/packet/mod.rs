pub mod context;
pub mod error;
pub mod ip;
pub mod link;
pub mod reader;
pub mod transport;

pub use context::{FragmentFlag, PacketContext};
pub use error::PacketError;
pub use ip::{rebuild_datagram, FragmentInfo, IpDatagram};
pub use link::LinkType;
pub use reader::PacketReader;
pub use transport::{TcpFlags, TransportSegment};
