//! Domain layer: the registration record, the form snapshot and its rules, and
//! the ports the workflow depends on.

pub mod form;
pub mod notification;
pub mod ports;
pub mod registration;
pub mod return_signal;
pub mod validation;
