//! Form domain layer
//!
//! Field values, declarative validation and the submission state machine.
//! Nothing here talks to the backend; the app feeds collaborator outcomes
//! back through [`FormModel::finish_submit`].

mod field;
mod form_state;
mod submission;
mod validation;

pub use field::{FieldValue, FormField};
pub use form_state::{Form, FormKind, FormModel};
pub use submission::{SubmitDecision, SubmitPhase};
pub use validation::FormValues;
