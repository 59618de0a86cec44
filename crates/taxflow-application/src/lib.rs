//! Application layer for TaxFlow.
//!
//! This crate provides the workflow controller that coordinates the backend
//! port with the client-held session, and a pure renderer from workflow
//! state to a view description.

pub mod view;
pub mod workflow;

pub use view::{WorkflowView, render};
pub use workflow::{TaxWorkflow, TurnOutcome, WorkflowEvent, WorkflowState};
