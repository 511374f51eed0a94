//! Cross-crate tests over loopback sockets and temp directories. Nothing
//! here touches the internet.

mod datasets;
mod relay;
mod tls;
mod util;
