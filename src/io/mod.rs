//! Binary I/O helpers
//!
//! This module provides byte order strategies used by the WKB codec.

pub mod byte_order;
