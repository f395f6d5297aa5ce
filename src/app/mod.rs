//! 应用层进程
//!
//! 建立在网络 API 之上的几个常用进程：收包循环、定速发送、ping/echo。

mod ping;
mod receiver;
mod sender;
mod sink;

pub use ping::{Echo, PING, PONG, PingReport, Pinger, PingerOpts};
pub use receiver::{PacketHandler, Receiver, WakeProcess};
pub use sender::ConstantRateSender;
pub use sink::{Sink, SinkReport};
