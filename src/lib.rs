//! Vendor-portal administration over the VpItem admin API and the retail
//! catalog (SdItem) service.
//!
//! The library is headless: every editable grid of the portal is modelled as
//! an [`table::EntityTable`] (write-through cache + row-edit buffer +
//! validation gate) driven by the `vp-admin` binary.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod edit;
pub mod guid;
pub mod http;
pub mod send;
pub mod table;
pub mod validation;
