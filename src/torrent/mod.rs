//! Module for `.torrent` files related creation/encoding.

pub mod v1;
