//! Application layer driving a registration from form to completed record.
//!
//! `RegistrationOrchestrator` owns the workflow. It persists pending records
//! through `RegistrationStore`, parks the in-flight record in a `SessionSlot`
//! while the browser is away at the hosted payment page, and reports progress
//! through the `Presenter` port.

pub mod orchestrator;
pub mod session;
pub mod store;
pub mod view;
