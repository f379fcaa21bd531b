//! Authentication and record-store collaborator

mod error;
mod memory;
mod subscription;
mod traits;
mod types;

pub use error::{AuthError, CollaboratorError, StoreError};
pub use memory::MemoryBackend;
pub use subscription::Subscription;
pub use traits::Backend;
pub use types::{Filter, RecordFields, Session};

#[cfg(test)]
pub use traits::MockBackend;
#[cfg(test)]
pub use types::{Record, RecordId};
