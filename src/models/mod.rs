//! Core data models for the vacation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod collaborator;
mod period;
mod vacation_request;

pub use collaborator::{
    Collaborator, CollaboratorPatch, EmploymentType, MAX_NAME_LENGTH, NewCollaborator,
};
pub use period::{Period, PeriodDays, PeriodLimits, PeriodRange, Situation};
pub use vacation_request::{
    ApprovalDecision, ApprovalVacation, NewApproval, NewVacationRequest, RequestStatus,
    VacationRequest, VacationRequestPatch,
};
